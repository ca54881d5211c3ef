use std::borrow::Cow;

/// Ordered `remote_url -> local_path` rules collected while archiving one post.
///
/// The first path registered for a URL wins; later registrations are ignored.
#[derive(Debug, Clone, Default)]
pub struct SubstitutionTable {
    pairs: Vec<(String, String)>,
}

impl SubstitutionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `false` if the URL was already registered.
    pub fn insert(&mut self, remote_url: impl Into<String>, local_path: impl Into<String>) -> bool {
        let remote_url = remote_url.into();
        if self.contains(&remote_url) {
            return false;
        }
        self.pairs.push((remote_url, local_path.into()));
        true
    }

    pub fn contains(&self, remote_url: &str) -> bool {
        self.get(remote_url).is_some()
    }

    pub fn get(&self, remote_url: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(url, _)| url == remote_url)
            .map(|(_, path)| path.as_str())
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(u, p)| (u.as_str(), p.as_str()))
    }

    /// Replaces every occurrence of each registered URL in one left-to-right pass.
    ///
    /// At each position the earliest-registered matching URL is taken and the
    /// scan resumes after it, so substituted text is never rewritten again.
    pub fn rewrite<'a>(&self, body: &'a str) -> Cow<'a, str> {
        if self.pairs.is_empty() {
            return Cow::Borrowed(body);
        }

        let mut out = String::with_capacity(body.len());
        let mut copied_to = 0;
        let mut pos = 0;
        let bytes = body.as_bytes();

        while pos < bytes.len() {
            let hit = self
                .pairs
                .iter()
                .find(|(url, _)| !url.is_empty() && bytes[pos..].starts_with(url.as_bytes()));

            match hit {
                Some((url, path)) => {
                    out.push_str(&body[copied_to..pos]);
                    out.push_str(path);
                    pos += url.len();
                    copied_to = pos;
                }
                None => pos += 1,
            }
        }

        if copied_to == 0 {
            return Cow::Borrowed(body);
        }
        out.push_str(&body[copied_to..]);
        Cow::Owned(out)
    }
}
