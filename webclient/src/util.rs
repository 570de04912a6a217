use url::Url;

use crate::error::*;

pub fn parse_url(url: impl AsRef<str>) -> Result<Url> {
    match Url::parse(url.as_ref()) {
        Ok(url) => Ok(url),
        Err(e) => Err(Error::InvalidSyntaxUrl {
            url: url.as_ref().to_owned(),
            source: e,
        }),
    }
}

/// Append resource `path` to `base` keeping every segment of `base`.
/// (`Url::join` would replace the last segment of a base without trailing slash.)
pub fn join_url(base: &Url, path: &str) -> Result<Url> {
    let base = base.as_str().trim_end_matches('/');
    let path = path.trim_start_matches('/');
    self::parse_url(format!("{}/{}", base, path))
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_join_url() {
        let base = Url::parse("http://localhost/jobe/index.php/restapi").unwrap();
        let url = join_url(&base, "/files/abc123").unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost/jobe/index.php/restapi/files/abc123"
        );

        // Trailing slash of the resource is kept:
        let url = join_url(&base, "/runs/").unwrap();
        assert_eq!(url.as_str(), "http://localhost/jobe/index.php/restapi/runs/");

        // Trailing slash of the base does not double:
        let base = Url::parse("http://example.com:8080/restapi/").unwrap();
        let url = join_url(&base, "/languages").unwrap();
        assert_eq!(url.as_str(), "http://example.com:8080/restapi/languages");
    }

    #[test]
    fn test_parse_url_error() {
        let err = parse_url("not a url").unwrap_err();
        assert!(matches!(err, Error::InvalidSyntaxUrl { url, .. } if url == "not a url"));
    }
}
