pub use sea_orm_migration::prelude::*;

mod m20250301_000001_create_schema;
mod m20250301_000002_add_trackable_events;
mod m20250301_000003_add_credential_tables;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250301_000001_create_schema::Migration),
            Box::new(m20250301_000002_add_trackable_events::Migration),
            Box::new(m20250301_000003_add_credential_tables::Migration),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn migrations_are_ordered_by_name() {
        let names: Vec<String> = Migrator::migrations()
            .iter()
            .map(|m| m.name().to_string())
            .collect();
        let mut sorted = names.clone();
        sorted.sort();
        assert_eq!(names, sorted);
        assert_eq!(names.len(), 3);
    }
}
