/*
 * Responsibility
 * - GET / (AuthContext の "user" を読むだけのデモ)
 */
use crate::api::v1::extractors::AuthCtxExtractor;
use crate::domain::auth::User;

pub const USER_FIELD: &str = "user";

pub async fn home(AuthCtxExtractor(ctx): AuthCtxExtractor) -> String {
    let username = ctx
        .get::<User>(USER_FIELD)
        .map(User::username)
        .unwrap_or("Anonymous");

    format!("Hello, {username} !")
}
