//! Integration tests for the Postgres user store
//!
//! Require Docker; run with `cargo test -p domain_users --test integration_test -- --ignored`.

use domain_users::*;
use test_utils::TestDatabase;
use uuid::Uuid;

fn local_user(email: &str) -> User {
    User::new_local(
        email.to_string(),
        "Ana Souza".to_string(),
        "$argon2id$v=19$m=19456,t=2,p=1$c2FsdA$aGFzaA".to_string(),
        Role::Coordenador,
    )
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_create_and_lookup() {
    let db = TestDatabase::new().await;
    let repo = PgUserRepository::new(db.connection());

    let created = repo.create(local_user("ana@escola.org")).await.unwrap();

    let by_id = repo.get_by_id(created.id).await.unwrap().unwrap();
    assert_eq!(by_id.email, "ana@escola.org");
    assert_eq!(by_id.role, Role::Coordenador);
    assert!(by_id.password_hash.is_some());

    let by_email = repo.get_by_email("ANA@escola.org").await.unwrap();
    assert_eq!(by_email.map(|u| u.id), Some(created.id));

    assert!(repo.get_by_id(Uuid::now_v7()).await.unwrap().is_none());
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_duplicate_email_is_conflict() {
    let db = TestDatabase::new().await;
    let repo = PgUserRepository::new(db.connection());

    repo.create(local_user("ana@escola.org")).await.unwrap();
    let result = repo.create(local_user("ana@escola.org")).await;

    assert!(matches!(result, Err(UserError::DuplicateEmail(_))));
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_update_role_and_list() {
    let db = TestDatabase::new().await;
    let repo = PgUserRepository::new(db.connection());

    let ana = repo.create(local_user("ana@escola.org")).await.unwrap();
    repo.create(local_user("bruno@escola.org")).await.unwrap();

    let promoted = repo
        .update_role(ana.id, Role::Supervisor)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(promoted.role, Role::Supervisor);
    assert!(promoted.updated_at >= ana.updated_at);

    assert!(
        repo.update_role(Uuid::now_v7(), Role::Supervisor)
            .await
            .unwrap()
            .is_none()
    );

    let users = repo.list().await.unwrap();
    assert_eq!(users.len(), 2);
    assert_eq!(users[0].id, ana.id);
}
