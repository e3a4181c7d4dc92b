//! External-reference locators.
//!
//! Remote entries come in two written forms:
//!
//! ```text
//! url::https://example.org/src/contrib/Archive/foo/foo_1.2.tar.gz
//! owner/repo[/subdir][@ref]
//! ```
//!
//! Package identity is derived from the locator: the trailing
//! `name_version.ext` pattern for URL remotes, the last path segment for
//! repository remotes. Repositories whose package name does not match the
//! repository name are listed in [`NAME_OVERRIDES`].

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Prefix marking a direct-URL remote.
pub const URL_PREFIX: &str = "url::";

/// Repositories whose package name differs from the repository name.
///
/// Configuration data: extend this table when adding such a remote, the
/// derivation logic itself stays untouched.
pub const NAME_OVERRIDES: &[(&str, &str)] = &[
    ("satijalab/seurat-data", "SeuratData"),
    ("satijalab/seurat-wrappers", "SeuratWrappers"),
    ("mojaveazure/seurat-disk", "SeuratDisk"),
    ("chris-mcginnis-ucsf/DoubletFinder", "DoubletFinder"),
    ("cole-trapnell-lab/monocle3", "monocle3"),
];

/// Source archive extensions recognized on URL remotes.
const ARCHIVE_EXTENSIONS: &[&str] = &[".tar.gz", ".tgz", ".tar.bz2", ".zip"];

/// A parsed external-reference locator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RemoteRef {
    /// Direct URL to a source archive (`url::` form)
    Url(String),
    /// Repository reference (`owner/repo[/subdir][@ref]` form)
    Repo {
        /// Repository owner
        owner: String,
        /// Repository name
        repo: String,
        /// Package subdirectory within the repository, if any
        subdir: Option<String>,
        /// Git ref (tag, branch, commit), if pinned
        reference: Option<String>,
    },
}

impl RemoteRef {
    /// Parse a locator as written in a manifest `Remotes` field.
    pub fn parse(locator: &str) -> Result<Self> {
        let locator = locator.trim();

        if let Some(url) = locator.strip_prefix(URL_PREFIX) {
            if url.is_empty() {
                return Err(Error::RemoteLocator {
                    locator: locator.to_string(),
                    message: "empty URL".to_string(),
                });
            }
            return Ok(RemoteRef::Url(url.to_string()));
        }

        let (path, reference) = match locator.split_once('@') {
            Some((p, r)) if !r.is_empty() => (p, Some(r.to_string())),
            Some((_, _)) => {
                return Err(Error::RemoteLocator {
                    locator: locator.to_string(),
                    message: "empty ref after '@'".to_string(),
                });
            }
            None => (locator, None),
        };

        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        if segments.len() < 2 {
            return Err(Error::RemoteLocator {
                locator: locator.to_string(),
                message: "expected owner/repo[/subdir][@ref]".to_string(),
            });
        }

        Ok(RemoteRef::Repo {
            owner: segments[0].to_string(),
            repo: segments[1].to_string(),
            subdir: if segments.len() > 2 {
                Some(segments[2..].join("/"))
            } else {
                None
            },
            reference,
        })
    }

    /// Derive the package identity for this remote.
    pub fn package_name(&self) -> String {
        match self {
            RemoteRef::Url(url) => url_package_name(url),
            RemoteRef::Repo {
                owner,
                repo,
                subdir,
                ..
            } => {
                let key = format!("{owner}/{repo}");
                if let Some((_, name)) = NAME_OVERRIDES
                    .iter()
                    .find(|(k, _)| k.eq_ignore_ascii_case(&key))
                {
                    return (*name).to_string();
                }
                // Last path segment: subdir (deepest component) when present,
                // otherwise the repository name.
                match subdir {
                    Some(s) => s.rsplit('/').next().unwrap_or(s).to_string(),
                    None => repo.clone(),
                }
            }
        }
    }

    /// The canonical written form of this locator.
    pub fn locator(&self) -> String {
        match self {
            RemoteRef::Url(url) => format!("{URL_PREFIX}{url}"),
            RemoteRef::Repo {
                owner,
                repo,
                subdir,
                reference,
            } => {
                let mut s = format!("{owner}/{repo}");
                if let Some(sub) = subdir {
                    s.push('/');
                    s.push_str(sub);
                }
                if let Some(r) = reference {
                    s.push('@');
                    s.push_str(r);
                }
                s
            }
        }
    }
}

impl std::fmt::Display for RemoteRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.locator())
    }
}

/// Derive a package name from a source-archive URL.
///
/// Matches the trailing `name_version.ext` pattern; falls back to the bare
/// file stem when no underscore separator is present.
fn url_package_name(url: &str) -> String {
    let file = url
        .rsplit('/')
        .next()
        .unwrap_or(url)
        .split(['?', '#'])
        .next()
        .unwrap_or(url);

    let mut stem = file;
    for ext in ARCHIVE_EXTENSIONS {
        if let Some(s) = stem.strip_suffix(ext) {
            stem = s;
            break;
        }
    }

    match stem.split_once('_') {
        Some((name, _version)) => name.to_string(),
        None => stem.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_url_form() {
        let r = RemoteRef::parse("url::https://example.org/Archive/foo/foo_1.2.tar.gz").unwrap();
        assert_eq!(r.package_name(), "foo");
        assert_eq!(
            r.locator(),
            "url::https://example.org/Archive/foo/foo_1.2.tar.gz"
        );
    }

    #[test]
    fn test_parse_repo_form() {
        let r = RemoteRef::parse("satijalab/seurat-object").unwrap();
        assert_eq!(r.package_name(), "seurat-object");
        assert_eq!(r.locator(), "satijalab/seurat-object");
    }

    #[test]
    fn test_parse_repo_with_ref() {
        let r = RemoteRef::parse("cole-trapnell-lab/monocle3@v1.3.1").unwrap();
        match &r {
            RemoteRef::Repo { reference, .. } => {
                assert_eq!(reference.as_deref(), Some("v1.3.1"));
            }
            RemoteRef::Url(_) => panic!("expected repo form"),
        }
        assert_eq!(r.locator(), "cole-trapnell-lab/monocle3@v1.3.1");
    }

    #[test]
    fn test_parse_repo_with_subdir() {
        let r = RemoteRef::parse("owner/mono-repo/pkgs/widget@main").unwrap();
        assert_eq!(r.package_name(), "widget");
        assert_eq!(r.locator(), "owner/mono-repo/pkgs/widget@main");
    }

    #[test]
    fn test_name_override_table() {
        let r = RemoteRef::parse("satijalab/seurat-data@v1.0").unwrap();
        assert_eq!(r.package_name(), "SeuratData");

        // Case-insensitive repo match
        let r = RemoteRef::parse("Satijalab/Seurat-Data").unwrap();
        assert_eq!(r.package_name(), "SeuratData");
    }

    #[test]
    fn test_url_name_extensions() {
        for url in [
            "url::https://x.org/a/pkg_0.9.tar.gz",
            "url::https://x.org/a/pkg_0.9.tgz",
            "url::https://x.org/a/pkg_0.9.zip",
        ] {
            assert_eq!(RemoteRef::parse(url).unwrap().package_name(), "pkg");
        }
    }

    #[test]
    fn test_url_name_without_version() {
        let r = RemoteRef::parse("url::https://x.org/pkg.tar.gz").unwrap();
        assert_eq!(r.package_name(), "pkg");
    }

    #[test]
    fn test_url_name_ignores_query() {
        let r = RemoteRef::parse("url::https://x.org/pkg_1.0.tar.gz?download=1").unwrap();
        assert_eq!(r.package_name(), "pkg");
    }

    #[test]
    fn test_parse_rejects_bad_locators() {
        assert!(RemoteRef::parse("url::").is_err());
        assert!(RemoteRef::parse("justonename").is_err());
        assert!(RemoteRef::parse("owner/repo@").is_err());
    }

    #[test]
    fn test_roundtrip_locator() {
        for s in [
            "owner/repo",
            "owner/repo@dev",
            "owner/repo/sub@v2",
            "url::https://e.org/p_1.tar.gz",
        ] {
            assert_eq!(RemoteRef::parse(s).unwrap().locator(), s);
        }
    }
}
