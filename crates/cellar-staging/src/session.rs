use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use cellar_util::errors::CoreError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Client-held session state: an ordered list of absolute staging-directory
/// paths, most-recently-used first (§3 "Session state", §9 "Session as a
/// cookie of paths").
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub upload_dirs: Vec<PathBuf>,
}

impl Session {
    /// Move `dir` to the front of `upload_dirs`, inserting it if absent.
    pub fn touch(&mut self, dir: &std::path::Path) {
        self.upload_dirs.retain(|p| p != dir);
        self.upload_dirs.insert(0, dir.to_path_buf());
    }

    /// Encode as an opaque cookie value: base64'd TOML.
    pub fn to_cookie(&self) -> Result<String, CoreError> {
        let toml = toml::to_string(self).map_err(|e| CoreError::Generic {
            message: format!("failed to serialize session: {e}"),
        })?;
        Ok(URL_SAFE_NO_PAD.encode(toml))
    }

    /// Decode a cookie value produced by [`Session::to_cookie`]. An absent
    /// or malformed cookie is treated as a fresh, empty session rather than
    /// an error — the client simply hasn't uploaded anything yet.
    pub fn from_cookie(cookie: Option<&str>) -> Self {
        let Some(cookie) = cookie else {
            return Self::default();
        };
        let Ok(bytes) = URL_SAFE_NO_PAD.decode(cookie) else {
            return Self::default();
        };
        let Ok(toml) = String::from_utf8(bytes) else {
            return Self::default();
        };
        toml::from_str(&toml).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn touch_moves_existing_entry_to_front() {
        let mut session = Session {
            upload_dirs: vec![PathBuf::from("/tmp/a"), PathBuf::from("/tmp/b")],
        };
        session.touch(&PathBuf::from("/tmp/b"));
        assert_eq!(
            session.upload_dirs,
            vec![PathBuf::from("/tmp/b"), PathBuf::from("/tmp/a")]
        );
    }

    #[test]
    fn touch_inserts_new_entry_at_front() {
        let mut session = Session::default();
        session.touch(&PathBuf::from("/tmp/a"));
        assert_eq!(session.upload_dirs, vec![PathBuf::from("/tmp/a")]);
    }

    #[test]
    fn cookie_round_trips() {
        let mut session = Session::default();
        session.touch(&PathBuf::from("/tmp/upload-1"));
        let cookie = session.to_cookie().unwrap();
        let decoded = Session::from_cookie(Some(&cookie));
        assert_eq!(decoded, session);
    }

    #[test]
    fn missing_cookie_is_empty_session() {
        assert_eq!(Session::from_cookie(None), Session::default());
    }

    #[test]
    fn garbage_cookie_is_empty_session() {
        assert_eq!(Session::from_cookie(Some("not valid base64!!")), Session::default());
    }
}
