/// Opaque credential holder.
///
/// The token is never interpreted locally: it is set after a successful
/// login, dropped on logout or when the backend answers 401, and otherwise
/// only ever forwarded on outgoing requests.
#[derive(Debug, Default, Clone)]
pub struct TokenStore {
    token: Option<String>,
}

impl TokenStore {
    pub fn new() -> Self {
        TokenStore::default()
    }

    pub fn set(&mut self, token: String) {
        self.token = Some(token);
    }

    pub fn clear(&mut self) {
        self.token = None;
    }

    pub fn get(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn is_signed_in(&self) -> bool {
        self.token.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_lifecycle() {
        let mut store = TokenStore::new();
        assert!(!store.is_signed_in());
        assert_eq!(store.get(), None);

        store.set("tok-abc".to_string());
        assert!(store.is_signed_in());
        assert_eq!(store.get(), Some("tok-abc"));

        store.clear();
        assert!(!store.is_signed_in());
    }
}
