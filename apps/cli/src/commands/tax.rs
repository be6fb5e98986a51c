//! # Tax Commands
//!
//! List, show, create, update, import and delete tax definitions, plus a
//! status report.

use serde::Serialize;
use tracing::{debug, info};

use crate::error::CliError;
use stockroom_core::validation::validate_uuid;
use stockroom_core::{CoreError, NewTax, Page, Tax, TaxQuery};
use stockroom_db::{migrations, Database};

/// Output of `delete`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Deleted {
    pub deleted: String,
}

/// Output of `status`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusReport {
    pub healthy: bool,
    pub taxes: i64,
    pub active_taxes: usize,
    pub migrations_total: usize,
    pub migrations_applied: usize,
}

pub async fn list(db: &Database, query: TaxQuery) -> Result<Page<Tax>, CliError> {
    let page = db.taxes().list(query).await?;
    debug!(total = page.total, returned = page.items.len(), "Listed taxes");
    Ok(page)
}

pub async fn get(db: &Database, id: &str) -> Result<Tax, CliError> {
    validate_uuid(id).map_err(CoreError::from)?;

    db.taxes()
        .get_by_id(id)
        .await?
        .ok_or_else(|| CoreError::TaxNotFound(id.to_string()).into())
}

pub async fn create(db: &Database, new_tax: NewTax) -> Result<Tax, CliError> {
    let tax = db.taxes().create(new_tax).await?;
    info!(id = %tax.id, name = %tax.name, "Tax created");
    Ok(tax)
}

/// Replaces the definition of tax `id`, keeping its id and creation time.
pub async fn update(db: &Database, id: &str, new_tax: NewTax) -> Result<Tax, CliError> {
    validate_uuid(id).map_err(CoreError::from)?;

    let tax = db.taxes().update(id, new_tax).await?;
    info!(id = %tax.id, "Tax updated");
    Ok(tax)
}

pub async fn delete(db: &Database, id: &str) -> Result<Deleted, CliError> {
    validate_uuid(id).map_err(CoreError::from)?;

    db.taxes().delete(id).await?;
    Ok(Deleted {
        deleted: id.to_string(),
    })
}

/// Creates every tax in `new_taxes`, or none of them.
pub async fn import(db: &Database, new_taxes: Vec<NewTax>) -> Result<Vec<Tax>, CliError> {
    if new_taxes.is_empty() {
        return Err(CliError::validation("import file contains no taxes"));
    }

    let created = db.taxes().create_many(new_taxes).await?;
    info!(count = created.len(), "Import complete");
    Ok(created)
}

pub async fn status(db: &Database) -> Result<StatusReport, CliError> {
    let healthy = db.health_check().await;
    let (migrations_total, migrations_applied) = migrations::migration_status(db.pool()).await?;

    Ok(StatusReport {
        healthy,
        taxes: db.taxes().count().await?,
        active_taxes: db.taxes().list_active().await?.len(),
        migrations_total,
        migrations_applied,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use stockroom_core::{TaxStatus, TaxType};
    use stockroom_db::DbConfig;

    async fn db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    fn vat(status: TaxStatus) -> NewTax {
        NewTax {
            name: "VAT".into(),
            rate: 20.0,
            tax_type: TaxType::Percentage,
            status,
            description: None,
            product_type: None,
            assignments: vec![],
            rules: vec![],
        }
    }

    #[tokio::test]
    async fn test_import_get_delete() {
        let db = db().await;

        let created = import(&db, vec![vat(TaxStatus::Active)]).await.unwrap();
        let id = created[0].id.clone();

        let tax = get(&db, &id).await.unwrap();
        assert_eq!(tax.name, "VAT");

        let deleted = delete(&db, &id).await.unwrap();
        assert_eq!(deleted.deleted, id);

        let err = get(&db, &id).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);

        let err = delete(&db, &id).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn test_create_then_update() {
        let db = db().await;
        let created = create(&db, vat(TaxStatus::Active)).await.unwrap();

        let mut changed = vat(TaxStatus::Inactive);
        changed.name = "VAT (reduced)".into();
        changed.rate = 5.0;
        let updated = update(&db, &created.id, changed).await.unwrap();

        assert_eq!(updated.id, created.id);
        assert_eq!(updated.created_at, created.created_at);
        assert_eq!(updated.name, "VAT (reduced)");
        assert_eq!(updated.status, TaxStatus::Inactive);

        let stored = get(&db, &created.id).await.unwrap();
        assert_eq!(stored.rate, 5.0);
    }

    #[tokio::test]
    async fn test_update_errors() {
        let db = db().await;

        let err = update(&db, "not-a-uuid", vat(TaxStatus::Active)).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);

        let missing = uuid::Uuid::new_v4().to_string();
        let err = update(&db, &missing, vat(TaxStatus::Active)).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);

        let created = create(&db, vat(TaxStatus::Active)).await.unwrap();
        let mut bad = vat(TaxStatus::Active);
        bad.rate = 150.0;
        let err = update(&db, &created.id, bad).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert_eq!(get(&db, &created.id).await.unwrap().rate, 20.0);
    }

    #[tokio::test]
    async fn test_get_rejects_malformed_id() {
        let db = db().await;
        let err = get(&db, "not-a-uuid").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
    }

    #[tokio::test]
    async fn test_import_from_json_file() {
        let db = db().await;
        let path = std::env::temp_dir().join(format!("stockroom-import-{}.json", uuid::Uuid::new_v4()));
        std::fs::write(
            &path,
            r#"[
                {"name": "US Sales Tax", "rate": 7.5, "type": "percentage",
                 "rules": [{"conditionField": "region", "operator": "==", "value": "US", "type": "string"}]},
                {"name": "Eco Fee", "rate": 1.25, "type": "fixed", "status": "inactive",
                 "assignments": [{"targetType": "category", "targetId": "electronics"}]}
            ]"#,
        )
        .unwrap();

        let new_taxes: Vec<NewTax> = crate::commands::read_json(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        let created = import(&db, new_taxes).await.unwrap();
        assert_eq!(created.len(), 2);
        assert_eq!(created[0].rules[0].tax_id, created[0].id);
        assert_eq!(created[1].assignments[0].tax_id, created[1].id);
        assert!(!created[1].assignments[0].id.is_empty());

        let report = status(&db).await.unwrap();
        assert!(report.healthy);
        assert_eq!(report.taxes, 2);
        assert_eq!(report.active_taxes, 1);
        assert_eq!(report.migrations_total, report.migrations_applied);
    }

    #[tokio::test]
    async fn test_import_rejects_invalid_and_empty() {
        let db = db().await;

        let err = import(&db, vec![]).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);

        let mut bad = vat(TaxStatus::Active);
        bad.rate = -1.0;
        let err = import(&db, vec![vat(TaxStatus::Active), bad])
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);

        let page = list(&db, TaxQuery::default()).await.unwrap();
        assert_eq!(page.total, 0);
    }
}
