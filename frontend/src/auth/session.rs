use web_sys::{window, Storage};

use crate::Route;

pub const TOKEN_KEY: &str = "token";
pub const ROLE_KEY: &str = "role";
const ADMIN_ROLE: &str = "admin";

fn storage() -> Option<Storage> {
    window()?.local_storage().ok()?
}

pub fn stored(key: &str) -> Option<String> {
    storage()?.get_item(key).ok()?
}

pub fn is_logged_in() -> bool {
    stored(TOKEN_KEY).is_some()
}

pub fn stored_role() -> Option<String> {
    stored(ROLE_KEY)
}

/// Where a visitor to the admin area is sent instead, if anywhere.
pub fn admin_redirect(role: Option<&str>) -> Option<Route> {
    match role {
        Some(ADMIN_ROLE) => None,
        _ => Some(Route::Dashboard),
    }
}

pub fn clear() {
    if let Some(storage) = storage() {
        let _ = storage.remove_item(TOKEN_KEY);
        let _ = storage.remove_item(ROLE_KEY);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_the_admin_role_enters_the_admin_area() {
        assert_eq!(admin_redirect(Some("admin")), None);
        assert_eq!(admin_redirect(Some("user")), Some(Route::Dashboard));
        assert_eq!(admin_redirect(Some("Admin")), Some(Route::Dashboard));
        assert_eq!(admin_redirect(None), Some(Route::Dashboard));
    }
}
