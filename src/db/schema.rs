use sea_orm::{ConnectionTrait, DatabaseConnection, DbBackend, DbErr, EntityTrait, Schema, Statement};
use tracing::info;

use crate::db::entities::{channel, giveaway, user, user_token};

fn create_table_statement<E: EntityTrait>(backend: DbBackend, entity: E) -> Statement {
    let schema = Schema::new(backend);
    let mut stmt = schema.create_table_from_entity(entity);
    stmt.if_not_exists();
    backend.build(&stmt)
}

/// Statements that bootstrap the schema, in dependency order.
pub fn bootstrap_statements(backend: DbBackend) -> Vec<Statement> {
    vec![
        create_table_statement(backend, user::Entity),
        create_table_statement(backend, user_token::Entity),
        create_table_statement(backend, channel::Entity),
        create_table_statement(backend, giveaway::Entity),
    ]
}

/// Creates any missing tables. Existing tables are left untouched.
pub async fn ensure_schema(db: &DatabaseConnection) -> Result<(), DbErr> {
    let backend = db.get_database_backend();
    for stmt in bootstrap_statements(backend) {
        db.execute(stmt).await?;
    }
    info!("Database schema is up to date.");
    Ok(())
}
