use uuid::Uuid;

/// An administrator account.
///
/// The password is stored and compared as plaintext; see DESIGN.md.
#[derive(Clone, Debug)]
pub struct AdminUser {
    /// The unique identifier for the admin.
    pub id: Uuid,
    /// The admin's login name. Unique.
    pub username: String,
    /// The admin's password.
    pub password: String,
}
