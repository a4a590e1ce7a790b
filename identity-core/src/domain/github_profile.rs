/// Profile data fetched from GitHub during an OAuth login.
///
/// Transient: folded into a [`super::user::User`] at first federated login,
/// never stored as its own entity. `email` stays optional because GitHub only
/// exposes it when the user made it public or granted the `user:email` scope.
#[derive(Debug, Clone)]
pub struct GithubProfile {
    pub id: String,
    pub login: String,
    pub email: Option<String>,
    pub display_name: String,
}
