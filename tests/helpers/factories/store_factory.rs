use crate::engine::store::{EntitySchema, FieldType, FilterCondition, FilterOp, MemoryStore};
use chrono::{DateTime, Utc};
use serde_json::{Value, json};
use std::sync::Arc;

/// Builds a `MemoryStore` shaped like a small shop: `User(email, name)` with
/// a `recent` filter and `Order(total, status, user_id)` with a `paid` filter.
pub struct StoreFactory {
    store: MemoryStore,
}

impl StoreFactory {
    pub fn new() -> Self {
        let mut store = MemoryStore::new();
        store
            .define(
                EntitySchema::new("User")
                    .with_field("email", FieldType::String)
                    .with_field("name", FieldType::String),
            )
            .expect("define User");
        store
            .define_filter(
                "User",
                "recent",
                vec![FilterCondition::new("created_at", FilterOp::WithinDays, 7)],
            )
            .expect("define User.recent");
        store
            .define(
                EntitySchema::new("Order")
                    .with_field("total", FieldType::Float)
                    .with_field("status", FieldType::String)
                    .with_field("user_id", FieldType::Optional(Box::new(FieldType::Integer))),
            )
            .expect("define Order");
        store
            .define_filter(
                "Order",
                "paid",
                vec![FilterCondition::new("status", FilterOp::Eq, "paid")],
            )
            .expect("define Order.paid");
        Self { store }
    }

    pub fn with_user(self, name: &str, email: &str) -> Self {
        self.with_user_at(name, email, Utc::now())
    }

    pub fn with_user_at(self, name: &str, email: &str, created_at: DateTime<Utc>) -> Self {
        self.with_record("User", json!({ "name": name, "email": email }), created_at)
    }

    pub fn with_order(self, total: f64, status: &str, user_id: Option<u64>) -> Self {
        self.with_order_at(total, status, user_id, Utc::now())
    }

    pub fn with_order_at(
        self,
        total: f64,
        status: &str,
        user_id: Option<u64>,
        created_at: DateTime<Utc>,
    ) -> Self {
        self.with_record(
            "Order",
            json!({ "total": total, "status": status, "user_id": user_id }),
            created_at,
        )
    }

    pub fn with_record(mut self, entity: &str, values: Value, created_at: DateTime<Utc>) -> Self {
        let Value::Object(values) = values else {
            panic!("record values must be a JSON object");
        };
        self.store
            .insert(entity, created_at, values)
            .expect("insert record");
        self
    }

    pub fn create(self) -> MemoryStore {
        self.store
    }

    pub fn create_shared(self) -> Arc<MemoryStore> {
        Arc::new(self.store)
    }
}
