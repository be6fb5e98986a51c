//! # Tax Repository
//!
//! Database operations for tax definitions.
//!
//! ## Key Operations
//! - CRUD over a tax together with its assignments and rules
//! - Filtered, sorted, paginated listing for the tax list screen
//! - `list_active`, the read side the evaluator is fed from
//!
//! ## Storage Layout
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Tax (in memory)                    SQLite                              │
//! │                                                                         │
//! │  Tax { id, name, rate, ... }   ──►  taxes            (1 row)            │
//! │    assignments: [a0, a1, ...]  ──►  tax_assignments  (position 0, 1...) │
//! │    rules:       [r0, r1, ...]  ──►  tax_rules        (position 0, 1...) │
//! │                                       value = JSON ("US" | 1000 | [..]) │
//! │                                                                         │
//! │  create / update: one transaction                                       │
//! │    INSERT/UPDATE taxes                                                  │
//! │    DELETE children (update only)                                        │
//! │    INSERT children in submitted order                                   │
//! │    COMMIT                                                               │
//! │                                                                         │
//! │  delete: DELETE FROM taxes, children go with ON DELETE CASCADE          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqlitePool};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use stockroom_core::validation::validate_tax;
use stockroom_core::{
    AssignmentTarget, ConditionField, NewTax, Page, RuleOperator, RuleValue, RuleValueType,
    SortDirection, Tax, TaxAssignment, TaxQuery, TaxRule, TaxSortField, TaxStatus, TaxType,
};

const TAX_COLUMNS: &str = "id, name, rate, tax_type, status, description, product_type, \
                           created_at, updated_at";

// =============================================================================
// Row Types
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct TaxRow {
    id: String,
    name: String,
    rate: f64,
    tax_type: TaxType,
    status: TaxStatus,
    description: Option<String>,
    product_type: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, sqlx::FromRow)]
struct AssignmentRow {
    id: String,
    tax_id: String,
    target_type: AssignmentTarget,
    target_id: String,
    target_name: String,
}

impl From<AssignmentRow> for TaxAssignment {
    fn from(row: AssignmentRow) -> Self {
        TaxAssignment {
            id: row.id,
            tax_id: row.tax_id,
            target_type: row.target_type,
            target_id: row.target_id,
            target_name: row.target_name,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct RuleRow {
    id: String,
    tax_id: String,
    condition_field: ConditionField,
    operator: String,
    value: String,
    value_type: RuleValueType,
}

impl TryFrom<RuleRow> for TaxRule {
    type Error = DbError;

    fn try_from(row: RuleRow) -> Result<Self, Self::Error> {
        let value: RuleValue = serde_json::from_str(&row.value)?;

        Ok(TaxRule {
            id: row.id,
            tax_id: row.tax_id,
            condition_field: row.condition_field,
            operator: RuleOperator::from(row.operator),
            value,
            value_type: row.value_type,
        })
    }
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for tax definitions.
///
/// ## Usage
/// ```rust,ignore
/// let repo = TaxRepository::new(pool);
///
/// let tax = repo.create(new_tax).await?;
/// let page = repo.list(TaxQuery::default()).await?;
/// let active = repo.list_active().await?;
/// ```
#[derive(Debug, Clone)]
pub struct TaxRepository {
    pool: SqlitePool,
}

impl TaxRepository {
    /// Creates a new TaxRepository.
    pub fn new(pool: SqlitePool) -> Self {
        TaxRepository { pool }
    }

    /// Validates and stores a new tax.
    ///
    /// ## What This Does
    /// 1. Rejects the input with `DbError::Validation` if any field is bad
    /// 2. Assigns a fresh id and sets `created_at == updated_at == now`
    /// 3. Stamps the new id onto every assignment and rule
    /// 4. Writes the tax and its children in one transaction
    ///
    /// ## Returns
    /// The tax as stored.
    pub async fn create(&self, new_tax: NewTax) -> DbResult<Tax> {
        validate_tax(&new_tax)?;

        let now = Utc::now();
        let tax = new_tax.into_tax(Uuid::new_v4().to_string(), now, now);

        debug!(id = %tax.id, name = %tax.name, "Creating tax");

        let mut tx = self.pool.begin().await?;
        insert_tax(&mut tx, &tax).await?;
        tx.commit().await?;

        info!(
            id = %tax.id,
            assignments = tax.assignments.len(),
            rules = tax.rules.len(),
            "Tax created"
        );
        Ok(tax)
    }

    /// Validates and stores several taxes atomically.
    ///
    /// Every input is validated before anything is written, and either all
    /// of them are stored or none are.
    pub async fn create_many(&self, new_taxes: Vec<NewTax>) -> DbResult<Vec<Tax>> {
        for new_tax in &new_taxes {
            validate_tax(new_tax)?;
        }

        let now = Utc::now();
        let taxes: Vec<Tax> = new_taxes
            .into_iter()
            .map(|t| t.into_tax(Uuid::new_v4().to_string(), now, now))
            .collect();

        debug!(count = taxes.len(), "Importing taxes");

        let mut tx = self.pool.begin().await?;
        for tax in &taxes {
            insert_tax(&mut tx, tax).await?;
        }
        tx.commit().await?;

        info!(count = taxes.len(), "Taxes imported");
        Ok(taxes)
    }

    /// Gets a tax by its ID, with assignments and rules in stored order.
    ///
    /// ## Returns
    /// * `Ok(Some(Tax))` - Tax found
    /// * `Ok(None)` - Tax not found
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Tax>> {
        let sql = format!("SELECT {TAX_COLUMNS} FROM taxes WHERE id = ?1");

        let row = sqlx::query_as::<_, TaxRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => Ok(Some(self.hydrate(row).await?)),
            None => Ok(None),
        }
    }

    /// Lists taxes for the tax list screen.
    ///
    /// ## Filters
    /// - `search`: case-insensitive substring of the name
    /// - `tax_type`, `status`: exact match
    ///
    /// Out-of-range paging is clamped (see [`TaxQuery::normalized`]). Rows
    /// that tie on the sort column are ordered by name, then id, so paging
    /// is stable.
    pub async fn list(&self, query: TaxQuery) -> DbResult<Page<Tax>> {
        let query = query.normalized();

        debug!(
            search = ?query.search,
            page = query.page,
            page_size = query.page_size,
            "Listing taxes"
        );

        let mut count_qb = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM taxes");
        push_filters(&mut count_qb, &query);
        let total: i64 = count_qb
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await?;

        let mut qb = QueryBuilder::<Sqlite>::new(format!("SELECT {TAX_COLUMNS} FROM taxes"));
        push_filters(&mut qb, &query);
        qb.push(" ORDER BY ")
            .push(sort_column(query.sort_by))
            .push(match query.sort_direction {
                SortDirection::Asc => " ASC",
                SortDirection::Desc => " DESC",
            })
            .push(", name COLLATE NOCASE ASC, id ASC LIMIT ")
            .push_bind(i64::from(query.page_size))
            .push(" OFFSET ")
            .push_bind(i64::from(query.offset()));

        let rows = qb.build_query_as::<TaxRow>().fetch_all(&self.pool).await?;

        let mut items = Vec::with_capacity(rows.len());
        for row in rows {
            items.push(self.hydrate(row).await?);
        }

        Ok(Page::new(items, total.max(0) as u64, &query))
    }

    /// Lists every active tax, oldest first (insertion order within an import).
    ///
    /// This is what a calculation is run against; inactive taxes would be
    /// dropped by the evaluator anyway, so they are not loaded.
    pub async fn list_active(&self) -> DbResult<Vec<Tax>> {
        let sql = format!(
            "SELECT {TAX_COLUMNS} FROM taxes WHERE status = ?1 ORDER BY created_at ASC, rowid ASC"
        );

        let rows = sqlx::query_as::<_, TaxRow>(&sql)
            .bind(TaxStatus::Active)
            .fetch_all(&self.pool)
            .await?;

        let mut taxes = Vec::with_capacity(rows.len());
        for row in rows {
            taxes.push(self.hydrate(row).await?);
        }

        debug!(count = taxes.len(), "Loaded active taxes");
        Ok(taxes)
    }

    /// Replaces a tax's fields and child collections.
    ///
    /// ## What This Does
    /// 1. Validates the input
    /// 2. Keeps `id` and `created_at`, bumps `updated_at`
    /// 3. Replaces all assignments and rules with the submitted ones
    ///
    /// ## Errors
    /// `DbError::NotFound` if no tax has this id.
    pub async fn update(&self, id: &str, new_tax: NewTax) -> DbResult<Tax> {
        validate_tax(&new_tax)?;

        debug!(id = %id, "Updating tax");

        let mut tx = self.pool.begin().await?;

        let created_at: Option<DateTime<Utc>> =
            sqlx::query_scalar("SELECT created_at FROM taxes WHERE id = ?1")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;

        let Some(created_at) = created_at else {
            return Err(DbError::tax_not_found(id));
        };

        let tax = new_tax.into_tax(id.to_string(), created_at, Utc::now());

        sqlx::query(
            r#"
            UPDATE taxes SET
                name = ?2,
                rate = ?3,
                tax_type = ?4,
                status = ?5,
                description = ?6,
                product_type = ?7,
                updated_at = ?8
            WHERE id = ?1
            "#,
        )
        .bind(&tax.id)
        .bind(&tax.name)
        .bind(tax.rate)
        .bind(tax.tax_type)
        .bind(tax.status)
        .bind(&tax.description)
        .bind(&tax.product_type)
        .bind(tax.updated_at)
        .execute(&mut *tx)
        .await?;

        sqlx::query("DELETE FROM tax_assignments WHERE tax_id = ?1")
            .bind(&tax.id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM tax_rules WHERE tax_id = ?1")
            .bind(&tax.id)
            .execute(&mut *tx)
            .await?;

        insert_children(&mut tx, &tax).await?;
        tx.commit().await?;

        info!(id = %tax.id, "Tax updated");
        Ok(tax)
    }

    /// Deletes a tax and, through the foreign keys, its assignments and rules.
    ///
    /// ## Errors
    /// `DbError::NotFound` if no tax has this id.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting tax");

        let result = sqlx::query("DELETE FROM taxes WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::tax_not_found(id));
        }

        info!(id = %id, "Tax deleted");
        Ok(())
    }

    /// Counts stored taxes (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM taxes")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    /// Loads the children of a tax row.
    async fn hydrate(&self, row: TaxRow) -> DbResult<Tax> {
        let assignments = sqlx::query_as::<_, AssignmentRow>(
            r#"
            SELECT id, tax_id, target_type, target_id, target_name
            FROM tax_assignments
            WHERE tax_id = ?1
            ORDER BY position
            "#,
        )
        .bind(row.id.as_str())
        .fetch_all(&self.pool)
        .await?;

        let rules = sqlx::query_as::<_, RuleRow>(
            r#"
            SELECT id, tax_id, condition_field, operator, value, value_type
            FROM tax_rules
            WHERE tax_id = ?1
            ORDER BY position
            "#,
        )
        .bind(row.id.as_str())
        .fetch_all(&self.pool)
        .await?;

        let rules = rules
            .into_iter()
            .map(TaxRule::try_from)
            .collect::<DbResult<Vec<_>>>()?;

        Ok(Tax {
            id: row.id,
            name: row.name,
            rate: row.rate,
            tax_type: row.tax_type,
            status: row.status,
            description: row.description,
            product_type: row.product_type,
            assignments: assignments.into_iter().map(TaxAssignment::from).collect(),
            rules,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

// =============================================================================
// Helpers
// =============================================================================

async fn insert_tax(conn: &mut SqliteConnection, tax: &Tax) -> DbResult<()> {
    sqlx::query(
        r#"
        INSERT INTO taxes (
            id, name, rate, tax_type, status, description, product_type,
            created_at, updated_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
        "#,
    )
    .bind(&tax.id)
    .bind(&tax.name)
    .bind(tax.rate)
    .bind(tax.tax_type)
    .bind(tax.status)
    .bind(&tax.description)
    .bind(&tax.product_type)
    .bind(tax.created_at)
    .bind(tax.updated_at)
    .execute(&mut *conn)
    .await?;

    insert_children(conn, tax).await
}

async fn insert_children(conn: &mut SqliteConnection, tax: &Tax) -> DbResult<()> {
    for (position, assignment) in tax.assignments.iter().enumerate() {
        sqlx::query(
            r#"
            INSERT INTO tax_assignments (id, tax_id, position, target_type, target_id, target_name)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&assignment.id)
        .bind(&tax.id)
        .bind(position as i64)
        .bind(assignment.target_type)
        .bind(&assignment.target_id)
        .bind(&assignment.target_name)
        .execute(&mut *conn)
        .await?;
    }

    for (position, rule) in tax.rules.iter().enumerate() {
        let value = serde_json::to_string(&rule.value)?;

        sqlx::query(
            r#"
            INSERT INTO tax_rules (id, tax_id, position, condition_field, operator, value, value_type)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&rule.id)
        .bind(&tax.id)
        .bind(position as i64)
        .bind(rule.condition_field)
        .bind(rule.operator.as_str())
        .bind(value)
        .bind(rule.value_type)
        .execute(&mut *conn)
        .await?;
    }

    Ok(())
}

fn push_filters(qb: &mut QueryBuilder<'_, Sqlite>, query: &TaxQuery) {
    let mut separator = " WHERE ";

    if let Some(search) = &query.search {
        qb.push(separator)
            .push("name LIKE ")
            .push_bind(format!("%{}%", escape_like(search)))
            .push(" ESCAPE '\\'");
        separator = " AND ";
    }

    if let Some(tax_type) = query.tax_type {
        qb.push(separator).push("tax_type = ").push_bind(tax_type);
        separator = " AND ";
    }

    if let Some(status) = query.status {
        qb.push(separator).push("status = ").push_bind(status);
    }
}

fn sort_column(field: TaxSortField) -> &'static str {
    match field {
        TaxSortField::Name => "name COLLATE NOCASE",
        TaxSortField::Rate => "rate",
        TaxSortField::Type => "tax_type",
        TaxSortField::Status => "status",
        TaxSortField::UpdatedAt => "updated_at",
    }
}

/// Escapes LIKE wildcards so a search for "10%" matches the literal text.
fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    async fn repo() -> TaxRepository {
        Database::new(DbConfig::in_memory()).await.unwrap().taxes()
    }

    fn sales_tax() -> NewTax {
        NewTax {
            name: "US Sales Tax".to_string(),
            rate: 7.5,
            tax_type: TaxType::Percentage,
            status: TaxStatus::Active,
            description: Some("State sales tax".to_string()),
            product_type: None,
            assignments: vec![
                TaxAssignment::new(AssignmentTarget::Product, "iphone15", "iPhone 15"),
                TaxAssignment::new(AssignmentTarget::Store, "store-1", "Downtown"),
            ],
            rules: vec![
                TaxRule::new(
                    ConditionField::Region,
                    RuleOperator::Eq,
                    RuleValue::Str("US".to_string()),
                ),
                TaxRule::new(
                    ConditionField::TotalAmount,
                    RuleOperator::Ge,
                    RuleValue::Num(1000.0),
                ),
                TaxRule::new(
                    ConditionField::CustomerType,
                    RuleOperator::In,
                    RuleValue::List(vec!["retail".to_string(), "wholesale".to_string()]),
                ),
            ],
        }
    }

    fn simple(name: &str, rate: f64, tax_type: TaxType, status: TaxStatus) -> NewTax {
        NewTax {
            name: name.to_string(),
            rate,
            tax_type,
            status,
            description: None,
            product_type: None,
            assignments: Vec::new(),
            rules: Vec::new(),
        }
    }

    #[tokio::test]
    async fn test_create_and_get_round_trip() {
        let repo = repo().await;
        let created = repo.create(sales_tax()).await.unwrap();

        assert_eq!(created.created_at, created.updated_at);
        assert!(created.assignments.iter().all(|a| a.tax_id == created.id));
        assert!(created.rules.iter().all(|r| r.tax_id == created.id));

        let loaded = repo.get_by_id(&created.id).await.unwrap().unwrap();
        assert_eq!(loaded.name, "US Sales Tax");
        assert_eq!(loaded.rate, 7.5);
        assert_eq!(loaded.tax_type, TaxType::Percentage);
        assert_eq!(loaded.description.as_deref(), Some("State sales tax"));
        assert_eq!(loaded.assignments, created.assignments);
        assert_eq!(loaded.rules, created.rules);
        assert_eq!(loaded.rules[1].value, RuleValue::Num(1000.0));
        assert_eq!(loaded.rules[2].value_type, RuleValueType::Array);
    }

    #[tokio::test]
    async fn test_get_missing_returns_none() {
        let repo = repo().await;
        assert!(repo.get_by_id("nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_create_rejects_invalid_input() {
        let repo = repo().await;

        let err = repo
            .create(simple("   ", 5.0, TaxType::Percentage, TaxStatus::Active))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Validation(_)));

        let err = repo
            .create(simple("Too much", 150.0, TaxType::Percentage, TaxStatus::Active))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Validation(_)));

        let mut bad_rule = simple("Bad rule", 5.0, TaxType::Percentage, TaxStatus::Active);
        bad_rule.rules.push(TaxRule::new(
            ConditionField::Quantity,
            RuleOperator::Gt,
            RuleValue::List(vec!["1".to_string()]),
        ));
        assert!(repo.create(bad_rule).await.is_err());

        assert_eq!(repo.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_unrecognized_operator_survives_storage() {
        let repo = repo().await;
        let tax = repo.create(sales_tax()).await.unwrap();

        sqlx::query("UPDATE tax_rules SET operator = 'matches' WHERE id = ?1")
            .bind(&tax.rules[0].id)
            .execute(&repo.pool)
            .await
            .unwrap();

        let loaded = repo.get_by_id(&tax.id).await.unwrap().unwrap();
        assert_eq!(
            loaded.rules[0].operator,
            RuleOperator::Unrecognized("matches".to_string())
        );
    }

    #[tokio::test]
    async fn test_update_replaces_children_and_keeps_created_at() {
        let repo = repo().await;
        let created = repo.create(sales_tax()).await.unwrap();

        let mut edit = NewTax::from(created.clone());
        edit.name = "US Sales Tax (revised)".to_string();
        edit.rate = 8.25;
        edit.assignments.truncate(1);
        edit.rules = vec![TaxRule::new(
            ConditionField::Quantity,
            RuleOperator::Ge,
            RuleValue::Num(2.0),
        )];

        let updated = repo.update(&created.id, edit).await.unwrap();
        assert_eq!(updated.id, created.id);
        assert_eq!(updated.created_at, created.created_at);
        assert!(updated.updated_at >= created.updated_at);

        let loaded = repo.get_by_id(&created.id).await.unwrap().unwrap();
        assert_eq!(loaded.name, "US Sales Tax (revised)");
        assert_eq!(loaded.rate, 8.25);
        assert_eq!(loaded.assignments.len(), 1);
        assert_eq!(loaded.rules.len(), 1);
        assert_eq!(loaded.rules[0].condition_field, ConditionField::Quantity);
        assert_eq!(loaded.rules[0].tax_id, created.id);
    }

    #[tokio::test]
    async fn test_update_missing_is_not_found() {
        let repo = repo().await;
        let err = repo
            .update("missing", simple("X", 1.0, TaxType::Fixed, TaxStatus::Active))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_delete_cascades() {
        let repo = repo().await;
        let tax = repo.create(sales_tax()).await.unwrap();

        repo.delete(&tax.id).await.unwrap();
        assert!(repo.get_by_id(&tax.id).await.unwrap().is_none());

        let orphans: i64 = sqlx::query_scalar(
            "SELECT (SELECT COUNT(*) FROM tax_assignments) + (SELECT COUNT(*) FROM tax_rules)",
        )
        .fetch_one(&repo.pool)
        .await
        .unwrap();
        assert_eq!(orphans, 0);

        let err = repo.delete(&tax.id).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_list_active_skips_inactive() {
        let repo = repo().await;
        repo.create(simple("VAT", 20.0, TaxType::Percentage, TaxStatus::Active))
            .await
            .unwrap();
        repo.create(simple("Old levy", 3.0, TaxType::Percentage, TaxStatus::Inactive))
            .await
            .unwrap();
        repo.create(simple("Eco fee", 50.0, TaxType::Fixed, TaxStatus::Active))
            .await
            .unwrap();

        let active = repo.list_active().await.unwrap();
        let names: Vec<_> = active.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["VAT", "Eco fee"]);
    }

    #[tokio::test]
    async fn test_list_filters_sorts_and_pages() {
        let repo = repo().await;
        for (name, rate, tax_type, status) in [
            ("City Tax", 2.0, TaxType::Percentage, TaxStatus::Active),
            ("State Tax", 6.0, TaxType::Percentage, TaxStatus::Active),
            ("Bottle Deposit", 0.25, TaxType::Fixed, TaxStatus::Active),
            ("Luxury Tax", 10.0, TaxType::Percentage, TaxStatus::Inactive),
            ("Import Duty", 15.0, TaxType::Fixed, TaxStatus::Active),
        ] {
            repo.create(simple(name, rate, tax_type, status)).await.unwrap();
        }

        let page = repo
            .list(TaxQuery {
                sort_by: TaxSortField::Name,
                sort_direction: SortDirection::Asc,
                page_size: 2,
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(page.total, 5);
        assert_eq!(page.total_pages, 3);
        let names: Vec<_> = page.items.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["Bottle Deposit", "City Tax"]);

        let last = repo
            .list(TaxQuery {
                sort_by: TaxSortField::Name,
                sort_direction: SortDirection::Asc,
                page: 3,
                page_size: 2,
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(last.items.len(), 1);
        assert_eq!(last.items[0].name, "State Tax");

        let search = repo
            .list(TaxQuery {
                search: Some("tax".to_string()),
                status: Some(TaxStatus::Active),
                sort_by: TaxSortField::Rate,
                sort_direction: SortDirection::Desc,
                ..Default::default()
            })
            .await
            .unwrap();
        let names: Vec<_> = search.items.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["State Tax", "City Tax"]);

        let fixed = repo
            .list(TaxQuery {
                tax_type: Some(TaxType::Fixed),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(fixed.total, 2);
    }

    #[tokio::test]
    async fn test_search_treats_wildcards_literally() {
        let repo = repo().await;
        repo.create(simple("GST 10%", 10.0, TaxType::Percentage, TaxStatus::Active))
            .await
            .unwrap();
        repo.create(simple("GST 100", 10.0, TaxType::Percentage, TaxStatus::Active))
            .await
            .unwrap();

        let page = repo
            .list(TaxQuery {
                search: Some("10%".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.items[0].name, "GST 10%");
    }

    #[tokio::test]
    async fn test_create_many_is_all_or_nothing() {
        let repo = repo().await;

        let err = repo
            .create_many(vec![
                simple("Good", 5.0, TaxType::Percentage, TaxStatus::Active),
                simple("", 5.0, TaxType::Percentage, TaxStatus::Active),
            ])
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Validation(_)));
        assert_eq!(repo.count().await.unwrap(), 0);

        let created = repo
            .create_many(vec![
                simple("One", 1.0, TaxType::Percentage, TaxStatus::Active),
                sales_tax(),
            ])
            .await
            .unwrap();
        assert_eq!(created.len(), 2);
        assert_eq!(repo.count().await.unwrap(), 2);
    }

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("10%"), "10\\%");
        assert_eq!(escape_like("a_b"), "a\\_b");
        assert_eq!(escape_like("plain"), "plain");
    }
}
