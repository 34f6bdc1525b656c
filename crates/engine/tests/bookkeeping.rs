//! Black-box tests for the bookkeeping facade over the in-memory stores.

use std::sync::Arc;

use chrono::{Duration, NaiveDate, Utc};

use stockbook_core::{DomainError, ItemId, PartyId, ProductId, approx_eq};
use stockbook_engine::Bookkeeper;
use stockbook_infra::{InMemoryInventoryStore, InMemoryLedgerStore, InMemorySnapshotStore};
use stockbook_inventory::{
    AdjustmentEntry, HistoryFilter, MovementKind, ProductionOrder, PurchaseEntry, Recipe,
    RecipeLine, StockItem, StockStatus,
};
use stockbook_ledger::{EntryAmount, Party, PartyKind, Posting, TransactionKind};
use stockbook_units::{Unit, UnitScheme};

type Books = Bookkeeper<
    Arc<InMemoryInventoryStore>,
    Arc<InMemoryLedgerStore>,
    Arc<InMemorySnapshotStore>,
>;

fn books() -> Books {
    stockbook_observability::init();
    Bookkeeper::new(
        Arc::new(InMemoryInventoryStore::new()),
        Arc::new(InMemoryLedgerStore::new()),
        Arc::new(InMemorySnapshotStore::new()),
    )
}

fn today() -> NaiveDate {
    Utc::now().date_naive()
}

fn kg_item(name: &str) -> StockItem {
    StockItem::new(
        ItemId::new(),
        name,
        UnitScheme::primary_only(Unit::new("kg", "Kilogram", "kg")),
    )
}

fn purchase(item_id: ItemId, quantity: f64, cost: f64, date: NaiveDate) -> PurchaseEntry {
    PurchaseEntry {
        item_id,
        quantity,
        cost_per_unit: cost,
        supplier: None,
        invoice_no: None,
        batch_no: None,
        expiry: None,
        date,
    }
}

fn posting(party_id: PartyId, amount: EntryAmount, date: NaiveDate) -> Posting {
    Posting {
        party_id,
        transaction_date: date,
        description: "Ledger entry".to_string(),
        amount,
        kind: TransactionKind::Sale,
        reference: None,
        payment_method: None,
        notes: None,
    }
}

#[test]
fn costing_scenario_purchases_then_production() {
    let books = books();
    let flour = kg_item("Flour");
    let flour_id = flour.id;
    books.register_item(flour);

    let receipt = books
        .apply_purchase(purchase(flour_id, 100.0, 0.50, today()))
        .unwrap();
    assert!(approx_eq(receipt.item.current_stock, 100.0));
    assert!(approx_eq(receipt.item.average_cost, 0.50));
    assert!(approx_eq(receipt.item.total_value, 50.0));

    let receipt = books
        .apply_purchase(purchase(flour_id, 50.0, 0.80, today()))
        .unwrap();
    assert!(approx_eq(receipt.item.current_stock, 150.0));
    assert!(approx_eq(receipt.item.average_cost, 0.60));
    assert!(approx_eq(receipt.item.total_value, 90.0));

    let product = ProductId::new();
    let entry = books
        .apply_production(ProductionOrder {
            product_id: product,
            quantity: 1.0,
            recipe: Recipe::new(
                product,
                vec![RecipeLine {
                    item_id: flour_id,
                    quantity_per_batch: 120.0,
                }],
            ),
            date: today(),
            reference: None,
        })
        .unwrap();

    assert_eq!(entry.consumed.len(), 1);
    assert!(approx_eq(entry.consumed[0].cost_allocated, 72.0));
    assert!(approx_eq(entry.total_cost(), 72.0));

    let item = books.item(&flour_id).unwrap();
    assert!(approx_eq(item.current_stock, 30.0));
    assert!(approx_eq(item.average_cost, 0.60));
    assert!(approx_eq(item.total_value, 18.0));
    assert!(item.value_consistent());

    let history = books.stock_history(&HistoryFilter::for_item(flour_id));
    assert_eq!(history.len(), 3);
    assert_eq!(history[0].kind, MovementKind::Purchase);
    assert_eq!(history[2].kind, MovementKind::Production);
    assert!(approx_eq(history[2].quantity, -120.0));
}

#[test]
fn short_production_changes_nothing_and_lists_the_shortfall() {
    let books = books();
    let sugar = kg_item("Sugar");
    let sugar_id = sugar.id;
    books.register_item(sugar);
    books
        .apply_purchase(purchase(sugar_id, 30.0, 1.0, today()))
        .unwrap();

    let product = ProductId::new();
    let err = books
        .apply_production(ProductionOrder {
            product_id: product,
            quantity: 1.0,
            recipe: Recipe::new(
                product,
                vec![RecipeLine {
                    item_id: sugar_id,
                    quantity_per_batch: 50.0,
                }],
            ),
            date: today(),
            reference: None,
        })
        .unwrap_err();

    match err {
        DomainError::InsufficientStock { shortfalls } => {
            assert_eq!(shortfalls.len(), 1);
            assert_eq!(shortfalls[0].item_id, sugar_id);
            assert!(approx_eq(shortfalls[0].required, 50.0));
            assert!(approx_eq(shortfalls[0].available, 30.0));
        }
        other => panic!("expected InsufficientStock, got {other:?}"),
    }

    let item = books.item(&sugar_id).unwrap();
    assert!(approx_eq(item.current_stock, 30.0));
    assert_eq!(
        books.stock_history(&HistoryFilter::for_item(sugar_id)).len(),
        1
    );
}

#[test]
fn multi_ingredient_production_is_all_or_nothing() {
    let books = books();
    let flour = kg_item("Flour");
    let butter = kg_item("Butter");
    let (flour_id, butter_id) = (flour.id, butter.id);
    books.register_item(flour);
    books.register_item(butter);
    books
        .apply_purchase(purchase(flour_id, 100.0, 0.50, today()))
        .unwrap();
    books
        .apply_purchase(purchase(butter_id, 2.0, 8.0, today()))
        .unwrap();

    let product = ProductId::new();
    let err = books
        .apply_production(ProductionOrder {
            product_id: product,
            quantity: 1.0,
            recipe: Recipe::new(
                product,
                vec![
                    RecipeLine {
                        item_id: flour_id,
                        quantity_per_batch: 10.0,
                    },
                    RecipeLine {
                        item_id: butter_id,
                        quantity_per_batch: 5.0,
                    },
                ],
            ),
            date: today(),
            reference: None,
        })
        .unwrap_err();
    assert!(matches!(err, DomainError::InsufficientStock { .. }));

    // The satisfiable ingredient must not have been deducted either.
    assert!(approx_eq(books.item(&flour_id).unwrap().current_stock, 100.0));
    assert!(approx_eq(books.item(&butter_id).unwrap().current_stock, 2.0));
}

#[test]
fn ledger_scenario_backdated_debit_recomputes_the_tail() {
    let books = books();
    let party = Party::new(PartyId::new(), "Acme Traders", PartyKind::Customer, 0.0);
    let party_id = party.id;
    books.register_party(party);

    let t1 = books
        .post_transaction(posting(
            party_id,
            EntryAmount::Debit(500.0),
            today() - Duration::days(10),
        ))
        .unwrap();
    assert!(approx_eq(t1.running_balance, 500.0));

    let t2 = books
        .post_transaction(posting(
            party_id,
            EntryAmount::Credit(200.0),
            today() - Duration::days(5),
        ))
        .unwrap();
    assert!(approx_eq(t2.running_balance, 300.0));

    // Backdated before both.
    let t3 = books
        .post_transaction(posting(
            party_id,
            EntryAmount::Debit(100.0),
            today() - Duration::days(20),
        ))
        .unwrap();
    assert!(approx_eq(t3.running_balance, 100.0));

    let statement = books.party_statement(&party_id).unwrap();
    let balances: Vec<f64> = statement
        .transactions
        .iter()
        .map(|t| t.running_balance)
        .collect();
    assert!(approx_eq(balances[0], 100.0));
    assert!(approx_eq(balances[1], 600.0));
    assert!(approx_eq(balances[2], 400.0));
    assert!(approx_eq(statement.total_debit, 600.0));
    assert!(approx_eq(statement.total_credit, 200.0));
    assert!(approx_eq(statement.party.current_balance, 400.0));

    let rows = statement.rows();
    assert_eq!(rows.len(), 3);
    assert!(approx_eq(rows[1].debit, 500.0));
    assert!(approx_eq(rows[1].balance, 600.0));
}

#[test]
fn posting_validation_rejects_without_state_change() {
    let books = books();
    let party = Party::new(PartyId::new(), "Acme Traders", PartyKind::Customer, 0.0);
    let party_id = party.id;
    books.register_party(party);

    // Future date.
    let err = books
        .post_transaction(posting(
            party_id,
            EntryAmount::Debit(50.0),
            today() + Duration::days(1),
        ))
        .unwrap_err();
    assert!(matches!(err, DomainError::Validation(_)));

    // Unknown party.
    let err = books
        .post_transaction(posting(PartyId::new(), EntryAmount::Debit(50.0), today()))
        .unwrap_err();
    assert!(matches!(err, DomainError::NotFound { .. }));

    let statement = books.party_statement(&party_id).unwrap();
    assert!(statement.transactions.is_empty());
    assert!(approx_eq(statement.party.current_balance, 0.0));
}

#[test]
fn day_close_freezes_state_and_refuses_to_run_twice() {
    let books = books();
    let mut flour = kg_item("Flour");
    flour.units = UnitScheme::with_secondary(
        Unit::new("kg", "Kilogram", "kg"),
        Unit::new("g", "Gram", "g"),
        1000.0,
    );
    let flour_id = flour.id;
    books.register_item(flour);

    let close_date = today() - Duration::days(1);
    books
        .apply_purchase(purchase(flour_id, 10.0, 2.0, close_date))
        .unwrap();

    let report = books.close_day(close_date).unwrap();
    assert_eq!(report.items_closed, 1);
    assert!(report.is_clean());
    assert!(books.day_is_closed(close_date));

    let snap = books.snapshot(close_date, &flour_id).unwrap();
    assert!(approx_eq(snap.primary_quantity, 10.0));
    assert_eq!(snap.secondary_quantity, Some(10_000.0));
    assert!(approx_eq(snap.average_cost, 2.0));
    assert!(snap.is_closed);

    // Re-closing the same date fails loudly.
    let err = books.close_day(close_date).unwrap_err();
    assert!(matches!(err, DomainError::AlreadyClosed { .. }));

    // A stock operation dated inside the closed period is rejected...
    let err = books
        .apply_purchase(purchase(flour_id, 1.0, 2.0, close_date))
        .unwrap_err();
    assert!(matches!(err, DomainError::Validation(_)));

    // ...while a later-dated correction goes through and leaves the frozen
    // snapshot untouched.
    books
        .apply_purchase(purchase(flour_id, 5.0, 3.0, today()))
        .unwrap();
    let snap_after = books.snapshot(close_date, &flour_id).unwrap();
    assert_eq!(snap_after, snap);
}

#[test]
fn day_close_is_best_effort_across_items() {
    let books = books();
    let good = kg_item("Flour");
    let good_id = good.id;
    books.register_item(good);

    // Broken conversion factor: capture fails for this item only.
    let mut broken = kg_item("Sugar");
    broken.units = UnitScheme::with_secondary(
        Unit::new("kg", "Kilogram", "kg"),
        Unit::new("g", "Gram", "g"),
        0.0,
    );
    let broken_id = broken.id;
    books.register_item(broken);

    let close_date = today();
    let report = books.close_day(close_date).unwrap();
    assert_eq!(report.items_closed, 1);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].item_id, broken_id);
    assert!(matches!(
        report.failures[0].error,
        DomainError::InvalidConversion(_)
    ));

    assert!(books.snapshot(close_date, &good_id).is_some());
    assert!(books.snapshot(close_date, &broken_id).is_none());
}

#[test]
fn inactive_items_are_skipped_by_close_and_rejected_by_commands() {
    let books = books();
    let mut retired = kg_item("Retired");
    retired.active = false;
    let retired_id = retired.id;
    books.register_item(retired);

    let err = books
        .apply_purchase(purchase(retired_id, 1.0, 1.0, today()))
        .unwrap_err();
    assert!(matches!(err, DomainError::Validation(_)));

    let report = books.close_day(today()).unwrap();
    assert_eq!(report.items_closed, 0);
    assert!(books.snapshot(today(), &retired_id).is_none());
}

#[test]
fn adjustment_corrects_stock_without_moving_the_cost_basis() {
    let books = books();
    let flour = kg_item("Flour");
    let flour_id = flour.id;
    books.register_item(flour);
    books
        .apply_purchase(purchase(flour_id, 20.0, 1.5, today()))
        .unwrap();

    let receipt = books
        .apply_adjustment(AdjustmentEntry {
            item_id: flour_id,
            quantity: -2.5,
            reason: "stocktake variance".to_string(),
            date: today(),
        })
        .unwrap();
    assert!(approx_eq(receipt.item.current_stock, 17.5));
    assert!(approx_eq(receipt.item.average_cost, 1.5));
    assert_eq!(receipt.record.kind, MovementKind::Adjustment);

    let history = books.stock_history(&HistoryFilter::for_item(flour_id));
    assert_eq!(history.len(), 2);
    assert!(approx_eq(history[1].quantity, -2.5));
}

#[test]
fn stock_overview_derives_status_from_reorder_level() {
    let books = books();

    let mut low = kg_item("Butter");
    low.reorder_level = 10.0;
    let low_id = low.id;
    books.register_item(low);
    books
        .apply_purchase(purchase(low_id, 5.0, 1.0, today()))
        .unwrap();

    let empty = kg_item("Anise");
    books.register_item(empty);

    let mut healthy = kg_item("Flour");
    healthy.reorder_level = 1.0;
    let healthy_id = healthy.id;
    books.register_item(healthy);
    books
        .apply_purchase(purchase(healthy_id, 40.0, 1.0, today()))
        .unwrap();

    let rows = books.stock_overview();
    assert_eq!(rows.len(), 3);
    // Sorted by name: Anise, Butter, Flour.
    assert_eq!(rows[0].status, StockStatus::OutOfStock);
    assert_eq!(rows[1].status, StockStatus::LowStock);
    assert_eq!(rows[2].status, StockStatus::InStock);
}

#[test]
fn history_supports_date_ranges_across_items() {
    let books = books();
    let flour = kg_item("Flour");
    let sugar = kg_item("Sugar");
    let (flour_id, sugar_id) = (flour.id, sugar.id);
    books.register_item(flour);
    books.register_item(sugar);

    let d0 = today() - Duration::days(6);
    let d1 = today() - Duration::days(3);
    books.apply_purchase(purchase(flour_id, 1.0, 1.0, d0)).unwrap();
    books.apply_purchase(purchase(sugar_id, 2.0, 1.0, d1)).unwrap();
    books
        .apply_purchase(purchase(flour_id, 3.0, 1.0, today()))
        .unwrap();

    let all = books.stock_history(&HistoryFilter::all());
    assert_eq!(all.len(), 3);
    assert!(all.windows(2).all(|w| (w[0].date, w[0].sequence) <= (w[1].date, w[1].sequence)));

    let ranged = books.stock_history(&HistoryFilter::all().between(d1, today()));
    assert_eq!(ranged.len(), 2);

    let flour_only = books.stock_history(&HistoryFilter::for_item(flour_id));
    assert_eq!(flour_only.len(), 2);
}
