//! Cart and checkout flows over a real catalog file and file-backed storage.

#![allow(clippy::unwrap_used)]

use std::fs;

use rust_decimal::Decimal;
use serde_json::json;
use url::Url;

use souq_core::{Locale, ProductId};
use souq_integration_tests::{TestShop, sample_catalog};
use souq_storefront::cart::AddOutcome;
use souq_storefront::catalog::{CatalogHandle, CatalogSource, load_catalog};
use souq_storefront::checkout::{CheckoutError, checkout_url};

fn id(s: &str) -> ProductId {
    ProductId::new(s)
}

fn dec(s: &str) -> Decimal {
    s.parse().unwrap()
}

fn text_param(url: &Url) -> String {
    url.query_pairs()
        .find(|(key, _)| key == "text")
        .map(|(_, value)| value.into_owned())
        .unwrap()
}

#[tokio::test]
async fn fan_and_lamp_order_reaches_whatsapp() {
    let shop = TestShop::new(&sample_catalog()).unwrap();
    let config = shop.config().unwrap();
    let catalog = load_catalog(&config.catalog_source).await.unwrap();
    let mut store = TestShop::open_cart(&config);

    assert_eq!(store.add_item(&id("P1"), &catalog), AddOutcome::Added);
    assert_eq!(
        store.add_item(&id("P1"), &catalog),
        AddOutcome::Incremented { quantity: 2 }
    );
    assert_eq!(store.add_item(&id("P2"), &catalog), AddOutcome::Added);

    let totals = store.aggregates();
    assert_eq!(totals.item_count, 3);
    assert_eq!(totals.total_amount, dec("130"));

    let vat = store.vat_breakdown(config.vat_rate);
    assert_eq!(vat.vat, dec("6.50"));
    assert_eq!(vat.total, dec("136.50"));

    let url = checkout_url(&store, &config.whatsapp_number).unwrap();
    assert_eq!(url.as_str().split('?').next(), Some("https://wa.me/971501234567"));
    assert_eq!(
        text_param(&url),
        "New order from Emirates Souq\n\
         1. Fan - Qty: 2 - Unit price: 50.00 AED - Subtotal: 100.00 AED\n\
         2. Lamp - Qty: 1 - Unit price: 30.00 AED - Subtotal: 30.00 AED\n\
         Items: 3\n\
         Total: 130.00 AED"
    );
}

#[tokio::test]
async fn cart_survives_reopen() {
    let shop = TestShop::new(&sample_catalog()).unwrap();
    let config = shop.config().unwrap();
    let catalog = load_catalog(&config.catalog_source).await.unwrap();

    {
        let mut store = TestShop::open_cart(&config);
        store.add_item(&id("P2"), &catalog);
        store.add_item(&id("P1"), &catalog);
        assert!(store.set_quantity(&id("P1"), 4));
    }
    assert!(TestShop::cart_file(&config).exists());

    let mut store = TestShop::open_cart(&config);
    let order: Vec<&str> = store.lines().map(|line| line.product_id.as_str()).collect();
    assert_eq!(order, ["P2", "P1"]);
    assert_eq!(store.aggregates().item_count, 5);
    assert_eq!(store.aggregates().total_amount, dec("230"));

    assert!(store.set_quantity(&id("P2"), 0));
    store.clear();
    assert!(TestShop::open_cart(&config).is_empty());
}

#[tokio::test]
async fn unknown_product_leaves_cart_untouched() {
    let shop = TestShop::new(&sample_catalog()).unwrap();
    let config = shop.config().unwrap();
    let catalog = load_catalog(&config.catalog_source).await.unwrap();
    let mut store = TestShop::open_cart(&config);
    store.add_item(&id("P1"), &catalog);
    let persisted = fs::read_to_string(TestShop::cart_file(&config)).unwrap();

    assert_eq!(store.add_item(&id("P404"), &catalog), AddOutcome::NotFound);

    assert_eq!(store.state().len(), 1);
    assert_eq!(
        fs::read_to_string(TestShop::cart_file(&config)).unwrap(),
        persisted
    );
}

#[tokio::test]
async fn corrupt_cart_file_starts_empty() {
    let shop = TestShop::new(&sample_catalog()).unwrap();
    let config = shop.config().unwrap();
    fs::create_dir_all(&config.storage_dir).unwrap();
    fs::write(TestShop::cart_file(&config), "{not json").unwrap();

    let mut store = TestShop::open_cart(&config);
    assert!(store.is_empty());
    assert_eq!(store.aggregates().total_amount, Decimal::ZERO);

    let catalog = load_catalog(&config.catalog_source).await.unwrap();
    store.add_item(&id("P2"), &catalog);
    assert_eq!(TestShop::open_cart(&config).aggregates().item_count, 1);
}

#[tokio::test]
async fn cart_keeps_the_price_it_was_added_at() {
    let shop = TestShop::new(&sample_catalog()).unwrap();
    let config = shop.config().unwrap();
    let catalog = load_catalog(&config.catalog_source).await.unwrap();
    TestShop::open_cart(&config).add_item(&id("P1"), &catalog);

    let repriced = json!([{"id": "P1", "title": "Fan Deluxe", "regular_price": 99}]);
    fs::write(shop.catalog_path(), repriced.to_string()).unwrap();
    let catalog = load_catalog(&config.catalog_source).await.unwrap();

    let mut store = TestShop::open_cart(&config);
    store.add_item(&id("P1"), &catalog);
    let line = store.state().get(&id("P1")).unwrap();
    assert_eq!(line.quantity, 2);
    assert_eq!(line.title, "Fan");
    assert_eq!(line.unit_price, dec("50"));
}

#[tokio::test]
async fn zero_sale_price_charges_regular_price() {
    let shop = TestShop::new(&sample_catalog()).unwrap();
    let config = shop.config().unwrap();
    let catalog = load_catalog(&config.catalog_source).await.unwrap();
    let mut store = TestShop::open_cart(&config);

    store.add_item(&id("P3"), &catalog);
    assert_eq!(store.aggregates().total_amount, dec("80"));
}

#[tokio::test]
async fn empty_cart_cannot_check_out() {
    let shop = TestShop::new(&sample_catalog()).unwrap();
    let config = shop.config().unwrap();
    let store = TestShop::open_cart(&config);

    assert!(matches!(
        checkout_url(&store, &config.whatsapp_number),
        Err(CheckoutError::EmptyCart)
    ));
}

#[tokio::test]
async fn arabic_order_message() {
    let shop = TestShop::new(&sample_catalog())
        .unwrap()
        .with_env("STOREFRONT_LOCALE", "ar");
    let config = shop.config().unwrap();
    assert_eq!(config.locale, Locale::Ar);
    let catalog = load_catalog(&config.catalog_source).await.unwrap();
    let mut store = TestShop::open_cart(&config);
    store.add_item(&id("P2"), &catalog);

    let message = text_param(&checkout_url(&store, &config.whatsapp_number).unwrap());
    assert!(message.starts_with("طلب جديد من سوق الإمارات"));
    assert!(message.ends_with("الإجمالي: 30.00 درهم"));
}

#[tokio::test]
async fn background_catalog_load_serves_lookups_once_ready() {
    let shop = TestShop::new(&sample_catalog()).unwrap();
    let source = CatalogSource::File(shop.catalog_path().to_path_buf());
    let config = shop.config().unwrap();

    let (handle, task) = CatalogHandle::spawn_load(source);
    task.await.unwrap();
    assert!(handle.is_ready());

    let mut store = TestShop::open_cart(&config);
    assert_eq!(store.add_item(&id("P2"), &handle), AddOutcome::Added);
}

#[tokio::test]
async fn missing_catalog_file_reports_failure() {
    let shop = TestShop::with_catalog_text("[]").unwrap();
    let source = CatalogSource::File(shop.catalog_path().with_file_name("missing.json"));

    let (handle, task) = CatalogHandle::spawn_load(source);
    task.await.unwrap();

    assert!(!handle.is_ready());
    assert!(handle.error().is_some());

    let config = shop.config().unwrap();
    let mut store = TestShop::open_cart(&config);
    assert_eq!(store.add_item(&id("P1"), &handle), AddOutcome::NotFound);
}

#[tokio::test]
async fn one_bad_persisted_line_keeps_the_rest() {
    let shop = TestShop::new(&sample_catalog()).unwrap();
    let config = shop.config().unwrap();
    fs::create_dir_all(&config.storage_dir).unwrap();
    let persisted = json!([
        {"productId": "P1", "title": "Fan", "unitPrice": "50", "quantity": 2},
        {"productId": "P2", "title": "Lamp", "unitPrice": "30", "quantity": -1}
    ]);
    fs::write(TestShop::cart_file(&config), persisted.to_string()).unwrap();

    let store = TestShop::open_cart(&config);
    assert_eq!(store.state().len(), 1);
    assert_eq!(store.state().get(&id("P1")).unwrap().quantity, 2);
    assert_eq!(store.aggregates().total_amount, dec("100"));
}

#[tokio::test]
async fn stepping_quantities_survives_reopen() {
    let shop = TestShop::new(&sample_catalog()).unwrap();
    let config = shop.config().unwrap();
    let catalog = load_catalog(&config.catalog_source).await.unwrap();

    {
        let mut store = TestShop::open_cart(&config);
        store.add_item(&id("P1"), &catalog);
        store.add_item(&id("P2"), &catalog);
        assert!(store.increment(&id("P1")));
        assert!(store.decrement(&id("P2")));
        store.flush().unwrap();
    }

    let store = TestShop::open_cart(&config);
    let lines: Vec<(&str, u32)> = store
        .lines()
        .map(|line| (line.product_id.as_str(), line.quantity))
        .collect();
    assert_eq!(lines, [("P1", 2)]);
}
