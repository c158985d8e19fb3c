//! Shared fixtures: a small order-management schema and a recording
//! in-memory executor.
#![allow(dead_code)]

use std::collections::HashMap;
use std::future::Future;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use relq::prelude::*;

//------------------------------------------------------------------------------
// Entities
//------------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Customer {
    pub id: i64,
    pub name: String,
    pub email: Option<String>,
    pub orders: Vec<Order>,
}

impl Entity for Customer {
    const NAME: &'static str = "Customer";

    fn schema() -> EntitySchema {
        EntitySchema::new("Customer", "customers")
            .key("id", FieldType::Int64)
            .field("name", FieldType::Text)
            .field("email", FieldType::Text)
            .navigation("orders", NavigationDecl::many("Order"))
    }

    fn from_row(row: &Row, schema: &EntitySchema) -> relq::Result<Self> {
        Ok(Self {
            id: row.get_as(schema, "id")?,
            name: row.get_as(schema, "name")?,
            email: row.get_as(schema, "email")?,
            orders: Vec::new(),
        })
    }

    fn get_field(&self, name: &str) -> Option<SqlValue> {
        match name {
            "id" => Some(self.id.into()),
            "name" => Some(self.name.as_str().into()),
            "email" => Some(self.email.clone().into()),
            _ => None,
        }
    }
}

impl Navigate<Order> for Customer {
    fn set_reference(&mut self, field: &str, _: Option<Order>) -> relq::Result<()> {
        Err(RelqError::Mapping(format!("`Customer.{field}` is not single-valued")))
    }

    fn set_collection(&mut self, field: &str, values: Vec<Order>) -> relq::Result<()> {
        match field {
            "orders" => {
                self.orders = values;
                Ok(())
            }
            other => Err(RelqError::Mapping(format!("`Customer.{other}` is not a collection"))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Order {
    pub id: i64,
    /// Narrower than `Customer::id` on purpose.
    pub customer_id: Option<i32>,
    pub total: i64,
    pub paid: bool,
    pub customer: Option<Customer>,
}

impl Entity for Order {
    const NAME: &'static str = "Order";

    fn schema() -> EntitySchema {
        EntitySchema::new("Order", "orders")
            .key("id", FieldType::Int64)
            .mapped("customerId", "customer_id", FieldType::Int32)
            .field("total", FieldType::Int64)
            .field("paid", FieldType::Bool)
            .navigation(
                "customer",
                NavigationDecl::one("Customer").local_keys(&["customerId"]),
            )
            .foreign_key(
                ForeignKeyDef::new("Customer", &["customerId"], &["id"])
                    .navigation_field("customer"),
            )
    }

    fn from_row(row: &Row, schema: &EntitySchema) -> relq::Result<Self> {
        Ok(Self {
            id: row.get_as(schema, "id")?,
            customer_id: row.get_as(schema, "customerId")?,
            total: row.get_as(schema, "total")?,
            paid: row.get_as(schema, "paid")?,
            customer: None,
        })
    }

    fn get_field(&self, name: &str) -> Option<SqlValue> {
        match name {
            "id" => Some(self.id.into()),
            "customerId" => Some(self.customer_id.into()),
            "total" => Some(self.total.into()),
            "paid" => Some(self.paid.into()),
            _ => None,
        }
    }
}

impl Navigate<Customer> for Order {
    fn set_reference(&mut self, field: &str, value: Option<Customer>) -> relq::Result<()> {
        match field {
            "customer" => {
                self.customer = value;
                Ok(())
            }
            other => Err(RelqError::Mapping(format!("`Order.{other}` is not a reference"))),
        }
    }

    fn set_collection(&mut self, field: &str, _: Vec<Customer>) -> relq::Result<()> {
        Err(RelqError::Mapping(format!("`Order.{field}` is not a collection")))
    }
}

/// Keyed by `(region, code)`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Warehouse {
    pub region: String,
    pub code: i32,
    pub name: String,
    pub shipments: Vec<Shipment>,
}

impl Entity for Warehouse {
    const NAME: &'static str = "Warehouse";

    fn schema() -> EntitySchema {
        EntitySchema::new("Warehouse", "warehouses")
            .key("region", FieldType::Text)
            .key("code", FieldType::Int32)
            .field("name", FieldType::Text)
            .navigation("shipments", NavigationDecl::many("Shipment"))
    }

    fn from_row(row: &Row, schema: &EntitySchema) -> relq::Result<Self> {
        Ok(Self {
            region: row.get_as(schema, "region")?,
            code: row.get_as(schema, "code")?,
            name: row.get_as(schema, "name")?,
            shipments: Vec::new(),
        })
    }

    fn get_field(&self, name: &str) -> Option<SqlValue> {
        match name {
            "region" => Some(self.region.as_str().into()),
            "code" => Some(self.code.into()),
            "name" => Some(self.name.as_str().into()),
            _ => None,
        }
    }
}

impl Navigate<Shipment> for Warehouse {
    fn set_reference(&mut self, field: &str, _: Option<Shipment>) -> relq::Result<()> {
        Err(RelqError::Mapping(format!("`Warehouse.{field}` is not single-valued")))
    }

    fn set_collection(&mut self, _: &str, values: Vec<Shipment>) -> relq::Result<()> {
        self.shipments = values;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Shipment {
    pub id: i64,
    pub region: String,
    pub warehouse_code: i64,
    pub order_id: Option<i64>,
    pub warehouse: Option<Warehouse>,
    pub order: Option<Order>,
}

impl Entity for Shipment {
    const NAME: &'static str = "Shipment";

    fn schema() -> EntitySchema {
        EntitySchema::new("Shipment", "shipments")
            .key("id", FieldType::Int64)
            .field("region", FieldType::Text)
            .mapped("warehouseCode", "warehouse_code", FieldType::Int64)
            .mapped("orderId", "order_id", FieldType::Int64)
            .navigation(
                "warehouse",
                NavigationDecl::one("Warehouse")
                    .local_keys(&["region", "warehouseCode"])
                    .foreign_keys(&["region", "code"]),
            )
            .foreign_key(ForeignKeyDef::new(
                "Warehouse",
                &["region", "warehouseCode"],
                &["region", "code"],
            ))
            .navigation("order", NavigationDecl::one("Order").local_keys(&["orderId"]))
            .foreign_key(ForeignKeyDef::new("Order", &["orderId"], &["id"]).navigation_field("order"))
    }

    fn from_row(row: &Row, schema: &EntitySchema) -> relq::Result<Self> {
        Ok(Self {
            id: row.get_as(schema, "id")?,
            region: row.get_as(schema, "region")?,
            warehouse_code: row.get_as(schema, "warehouseCode")?,
            order_id: row.get_as(schema, "orderId")?,
            warehouse: None,
            order: None,
        })
    }

    fn get_field(&self, name: &str) -> Option<SqlValue> {
        match name {
            "id" => Some(self.id.into()),
            "region" => Some(self.region.as_str().into()),
            "warehouseCode" => Some(self.warehouse_code.into()),
            "orderId" => Some(self.order_id.into()),
            _ => None,
        }
    }
}

impl Navigate<Warehouse> for Shipment {
    fn set_reference(&mut self, _: &str, value: Option<Warehouse>) -> relq::Result<()> {
        self.warehouse = value;
        Ok(())
    }

    fn set_collection(&mut self, field: &str, _: Vec<Warehouse>) -> relq::Result<()> {
        Err(RelqError::Mapping(format!("`Shipment.{field}` is not a collection")))
    }
}

impl Navigate<Order> for Shipment {
    fn set_reference(&mut self, _: &str, value: Option<Order>) -> relq::Result<()> {
        self.order = value;
        Ok(())
    }

    fn set_collection(&mut self, field: &str, _: Vec<Order>) -> relq::Result<()> {
        Err(RelqError::Mapping(format!("`Shipment.{field}` is not a collection")))
    }
}

/// Two foreign keys to `Account`, neither naming its navigation.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Invoice {
    pub id: i64,
    pub billed_to: i64,
    pub shipped_to: i64,
}

impl Entity for Invoice {
    const NAME: &'static str = "Invoice";

    fn schema() -> EntitySchema {
        EntitySchema::new("Invoice", "invoices")
            .key("id", FieldType::Int64)
            .mapped("billedTo", "billed_to", FieldType::Int64)
            .mapped("shippedTo", "shipped_to", FieldType::Int64)
            .foreign_key(ForeignKeyDef::new("Account", &["billedTo"], &["id"]))
            .foreign_key(ForeignKeyDef::new("Account", &["shippedTo"], &["id"]))
    }

    fn from_row(row: &Row, schema: &EntitySchema) -> relq::Result<Self> {
        Ok(Self {
            id: row.get_as(schema, "id")?,
            billed_to: row.get_as(schema, "billedTo")?,
            shipped_to: row.get_as(schema, "shippedTo")?,
        })
    }

    fn get_field(&self, name: &str) -> Option<SqlValue> {
        match name {
            "id" => Some(self.id.into()),
            "billedTo" => Some(self.billed_to.into()),
            "shippedTo" => Some(self.shipped_to.into()),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Account {
    pub id: i64,
    pub invoices: Vec<Invoice>,
}

impl Entity for Account {
    const NAME: &'static str = "Account";

    fn schema() -> EntitySchema {
        EntitySchema::new("Account", "accounts")
            .key("id", FieldType::Int64)
            .navigation("invoices", NavigationDecl::many("Invoice"))
    }

    fn from_row(row: &Row, schema: &EntitySchema) -> relq::Result<Self> {
        Ok(Self {
            id: row.get_as(schema, "id")?,
            invoices: Vec::new(),
        })
    }

    fn get_field(&self, name: &str) -> Option<SqlValue> {
        match name {
            "id" => Some(self.id.into()),
            _ => None,
        }
    }
}

impl Navigate<Invoice> for Account {
    fn set_reference(&mut self, field: &str, _: Option<Invoice>) -> relq::Result<()> {
        Err(RelqError::Mapping(format!("`Account.{field}` is not single-valued")))
    }

    fn set_collection(&mut self, _: &str, values: Vec<Invoice>) -> relq::Result<()> {
        self.invoices = values;
        Ok(())
    }
}

//------------------------------------------------------------------------------
// Rows
//------------------------------------------------------------------------------

pub fn customer_row(id: i64, name: &str) -> Row {
    Row::new()
        .with("id", id)
        .with("name", name)
        .with("email", SqlValue::Null)
}

/// `customer_id` comes back as a 64-bit integer, wider than the field.
pub fn order_row(id: i64, customer_id: Option<i64>, total: i64, paid: bool) -> Row {
    Row::new()
        .with("id", id)
        .with("customer_id", customer_id)
        .with("total", total)
        .with("paid", i32::from(paid))
}

pub fn warehouse_row(region: &str, code: i32, name: &str) -> Row {
    Row::new()
        .with("region", region)
        .with("code", code)
        .with("name", name)
}

pub fn shipment_row(id: i64, region: &str, warehouse_code: i64) -> Row {
    shipment_for_order(id, region, warehouse_code, None)
}

pub fn shipment_for_order(id: i64, region: &str, warehouse_code: i64, order_id: Option<i64>) -> Row {
    Row::new()
        .with("id", id)
        .with("region", region)
        .with("warehouse_code", warehouse_code)
        .with("order_id", order_id)
}

//------------------------------------------------------------------------------
// RecordingExecutor
//------------------------------------------------------------------------------

/// In-memory executor returning canned rows per table and recording every
/// query it is asked to run.
#[derive(Debug, Default)]
pub struct RecordingExecutor {
    rows: HashMap<&'static str, RowSet>,
    affected: u64,
    failing_table: Option<&'static str>,
    delay: Option<Duration>,
    calls: Mutex<Vec<CompiledQuery>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl RecordingExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rows(mut self, table: &'static str, rows: impl IntoIterator<Item = Row>) -> Self {
        self.rows.entry(table).or_default().extend(rows);
        self
    }

    pub fn with_affected(mut self, affected: u64) -> Self {
        self.affected = affected;
        self
    }

    /// Every query against `table` fails.
    pub fn failing_on(mut self, table: &'static str) -> Self {
        self.failing_table = Some(table);
        self
    }

    /// Async queries sleep for `delay` before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> Vec<CompiledQuery> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    fn answer(&self, query: &CompiledQuery) -> relq::Result<RowSet> {
        self.calls.lock().unwrap().push(query.clone());
        if self.failing_table == Some(query.table) {
            return Err(RelqError::Execution(format!("{} is unavailable", query.table)));
        }
        let rows = self.rows.get(query.table).cloned().unwrap_or_default();
        match query.statement {
            relq::Statement::Count => Ok(vec![Row::new().with("COUNT(*)", rows.len())]),
            _ => Ok(rows),
        }
    }

    fn affected_by(&self, query: &CompiledQuery) -> relq::Result<u64> {
        self.calls.lock().unwrap().push(query.clone());
        if self.failing_table == Some(query.table) {
            return Err(RelqError::Execution(format!("{} is unavailable", query.table)));
        }
        Ok(self.affected)
    }
}

impl Executor for RecordingExecutor {
    fn query(&self, query: &CompiledQuery) -> relq::Result<RowSet> {
        self.answer(query)
    }

    fn execute(&self, query: &CompiledQuery) -> relq::Result<u64> {
        self.affected_by(query)
    }
}

impl AsyncExecutor for RecordingExecutor {
    fn query(&self, query: &CompiledQuery) -> impl Future<Output = relq::Result<RowSet>> + Send {
        async move {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(now, Ordering::SeqCst);
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            self.answer(query)
        }
    }

    fn execute(&self, query: &CompiledQuery) -> impl Future<Output = relq::Result<u64>> + Send {
        std::future::ready(self.affected_by(query))
    }
}

//------------------------------------------------------------------------------
// Setup
//------------------------------------------------------------------------------

pub fn setup(executor: RecordingExecutor) -> Relq<RecordingExecutor> {
    Relq::new(executor)
        .register::<Customer>()
        .register::<Order>()
        .register::<Warehouse>()
        .register::<Shipment>()
        .register::<Invoice>()
        .register::<Account>()
}

pub fn empty_db() -> Relq<RecordingExecutor> {
    setup(RecordingExecutor::new())
}
