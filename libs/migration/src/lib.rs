pub use sea_orm_migration::prelude::*;

mod m20250101_000000_bootstrap;
mod m20250101_000001_create_users;
mod m20250101_000002_create_events;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250101_000000_bootstrap::Migration),
            Box::new(m20250101_000001_create_users::Migration),
            Box::new(m20250101_000002_create_events::Migration),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migrations_are_ordered() {
        let names: Vec<String> = Migrator::migrations().iter().map(|m| m.name().to_string()).collect();

        assert_eq!(names.len(), 3);
        let mut sorted = names.clone();
        sorted.sort();
        assert_eq!(names, sorted);
        assert!(names[2].ends_with("create_events"));
    }
}
