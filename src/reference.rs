/// A container image reference split into its parts.
///
/// `registry.example.com:5000/team/app:1.2` has domain
/// `registry.example.com:5000`, path `team/app` and tag `1.2`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageReference {
    pub domain: Option<String>,
    pub path: String,
    pub tag: Option<String>,
}

impl ImageReference {
    pub fn parse(reference: &str) -> Self {
        let name = match reference.split_once('@') {
            Some((name, _digest)) => name,
            None => reference,
        };

        let (name, tag) = match name.rfind(':') {
            Some(i) if !name[i..].contains('/') => (&name[..i], Some(name[i + 1..].to_string())),
            _ => (name, None),
        };

        let (domain, path) = match name.split_once('/') {
            Some((first, rest))
                if first.contains('.') || first.contains(':') || first == "localhost" =>
            {
                (Some(first.to_string()), rest.to_string())
            }
            _ => (None, name.to_string()),
        };

        Self {
            domain,
            path,
            tag: tag.filter(|t| !t.is_empty()),
        }
    }

    /// Whether the reference only pins an image id, without any repository.
    pub fn is_digest(reference: &str) -> bool {
        reference.contains("sha256:")
    }

    pub fn tag_or_latest(&self) -> String {
        self.tag.clone().unwrap_or_else(|| "latest".to_string())
    }
}
