//! # Repository Module
//!
//! Database repository implementations for the tax store.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  CLI command                                                           │
//! │       │                                                                 │
//! │       │  db.taxes().list(query)                                        │
//! │       ▼                                                                 │
//! │  TaxRepository                                                         │
//! │  ├── create(&self, new_tax)                                            │
//! │  ├── get_by_id(&self, id)                                              │
//! │  ├── list(&self, query)      → Page<Tax>                               │
//! │  ├── list_active(&self)      → Vec<Tax>  (evaluator's read side)       │
//! │  ├── update(&self, id, new_tax)                                        │
//! │  ├── delete(&self, id)                                                 │
//! │  └── count(&self)                                                      │
//! │       │                                                                 │
//! │       │  SQL (taxes + tax_assignments + tax_rules)                      │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`tax::TaxRepository`] - Tax definitions with their assignments and rules

pub mod tax;
