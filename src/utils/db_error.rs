/// Unique constraint over `(owner, origin)`.
pub const OWNER_ORIGIN_KEY: &str = "short_links_owner_origin_key";

/// Unique constraint over `short_code`.
pub const SHORT_CODE_KEY: &str = "short_links_short_code_key";

pub fn is_unique_violation_on(e: &sqlx::Error, constraint: &str) -> bool {
    let Some(db_err) = e.as_database_error() else {
        return false;
    };

    if !db_err.is_unique_violation() {
        return false;
    }

    db_err.constraint() == Some(constraint)
}
