use quotebook::db::SqliteStore;
use quotebook::error::StorageError;
use quotebook::items::ItemStore;
use quotebook::models::*;
use quotebook::persistence::{KeyValueStore, MemoryStore, PersistenceGateway, HISTORY_KEY, ITEMS_KEY};
use speculate2::speculate;

fn sample_items() -> Vec<Item> {
    let mut store = ItemStore::new();
    store.add(ItemInput::new("Consulting", 2.0, 100.0, 10.0)).unwrap();
    store.add(ItemInput::new("Travel", 1.0, 50.0, 0.0)).unwrap();
    store.add(ItemInput::new("Freebie", 1.0, 30.0, 150.0)).unwrap();
    store.list()
}

speculate! {
    before {
        let kv = MemoryStore::new();
        let gateway = PersistenceGateway::new(kv.clone());
    }

    describe "items" {
        it "loads an empty list when nothing is stored" {
            assert!(gateway.load_items().expect("Load failed").is_empty());
        }

        it "round trips a collection unchanged" {
            let items = sample_items();
            gateway.save_items(&items).expect("Save failed");

            let loaded = gateway.load_items().expect("Load failed");
            gateway.save_items(&loaded).expect("Save failed");

            assert_eq!(gateway.load_items().expect("Load failed"), items);
        }

        it "writes the documented JSON shape under budgetItems" {
            gateway.save_items(&sample_items()).unwrap();

            let raw = kv.get(ITEMS_KEY).unwrap().expect("Nothing stored");
            let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
            let first = &json[0];

            assert!(first["id"].is_string());
            assert_eq!(first["description"], "Consulting");
            assert_eq!(first["quantity"], 2.0);
            assert_eq!(first["unitPrice"], 100.0);
            assert_eq!(first["discount"], 10.0);
            assert_eq!(first["subtotal"], 180.0);
            assert_eq!(json[2]["discount"], 150.0);
        }

        it "replaces the previous value on every save" {
            gateway.save_items(&sample_items()).unwrap();
            gateway.save_items(&[]).unwrap();

            assert!(gateway.load_items().unwrap().is_empty());
        }

        it "recomputes cached subtotals instead of trusting them" {
            kv.set(ITEMS_KEY, r#"[{"id":"6f1c2a34-0000-4000-8000-000000000001","description":"Paint","quantity":4,"unitPrice":25,"discount":50,"subtotal":9999}]"#).unwrap();

            let items = gateway.load_items().expect("Load failed");
            assert_eq!(items[0].subtotal(), 50.0);
        }

        it "reports corrupted values" {
            kv.set(ITEMS_KEY, "{not json").unwrap();

            let result = gateway.load_items();
            assert!(matches!(result, Err(StorageError::Corrupted { .. })));
        }

        it "copies a corrupted value to a backup key" {
            kv.set(ITEMS_KEY, "{not json").unwrap();

            let err = gateway.load_items().unwrap_err();
            assert!(err.is_backed_up());
            assert_eq!(kv.get("budgetItems.corrupted").unwrap().as_deref(), Some("{not json"));
            assert_eq!(kv.get(ITEMS_KEY).unwrap().as_deref(), Some("{not json"));
        }

        it "keeps earlier backups when a different value is corrupted" {
            kv.set(ITEMS_KEY, "first").unwrap();
            assert!(gateway.load_items().is_err());
            kv.set(ITEMS_KEY, "second").unwrap();
            assert!(gateway.load_items().is_err());

            assert_eq!(kv.get("budgetItems.corrupted").unwrap().as_deref(), Some("first"));
            assert_eq!(kv.get("budgetItems.corrupted.1").unwrap().as_deref(), Some("second"));
        }

        it "loads items saved with numeric ids" {
            kv.set(ITEMS_KEY, r#"[{"id":1,"description":"A","quantity":1,"unitPrice":2,"discount":0,"subtotal":2},{"id":1,"description":"B","quantity":1,"unitPrice":3,"discount":0,"subtotal":3}]"#).unwrap();

            let items = gateway.load_items().expect("Load failed");
            assert_eq!(items.len(), 2);
            assert_ne!(items[0].id(), items[1].id());
        }
    }

    describe "history" {
        it "loads an empty history when nothing is stored" {
            assert!(gateway.load_history().expect("Load failed").is_empty());
        }

        it "stores snapshots with an iso date" {
            let mut archive = quotebook::history::HistoryArchive::open(gateway.clone());
            archive.snapshot(&sample_items()).unwrap();

            let raw = kv.get(HISTORY_KEY).unwrap().expect("Nothing stored");
            let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
            let date = json[0]["date"].as_str().expect("date is a string");

            assert!(chrono::DateTime::parse_from_rfc3339(date).is_ok());
            assert_eq!(json[0]["items"].as_array().unwrap().len(), 3);
            assert_eq!(gateway.load_history().unwrap(), archive.list());
        }

        it "removes the stored history on clear" {
            let mut archive = quotebook::history::HistoryArchive::open(gateway.clone());
            archive.snapshot(&sample_items()).unwrap();

            archive.clear_all();

            assert_eq!(kv.get(HISTORY_KEY).unwrap(), None);
            assert!(archive.is_durable());
        }

        it "loads snapshots saved with numeric ids" {
            kv.set(HISTORY_KEY, r#"[{"id":1700000000000,"date":"2024-01-01T10:00:00.000Z","items":[{"id":1700000000001,"description":"Paint","quantity":4,"unitPrice":25,"discount":50,"subtotal":50}]}]"#).unwrap();

            let history = gateway.load_history().expect("Load failed");
            assert_eq!(history.len(), 1);
            assert_eq!(history[0].items()[0].subtotal(), 50.0);
            assert_eq!(history[0].timestamp().to_rfc3339(), "2024-01-01T10:00:00+00:00");
        }
    }

    describe "sqlite" {
        before {
            let dir = tempfile::tempdir().expect("Failed to create temp dir");
            let path = dir.path().join("data").join("quotebook.db");
        }

        it "keeps items across reopening the file" {
            let items = sample_items();
            {
                let store = SqliteStore::open(path.clone()).expect("Failed to open");
                store.migrate().expect("Failed to migrate");
                PersistenceGateway::new(store).save_items(&items).expect("Save failed");
            }

            let store = SqliteStore::open(path.clone()).expect("Failed to reopen");
            store.migrate().expect("Failed to migrate");
            let loaded = PersistenceGateway::new(store).load_items().expect("Load failed");

            assert_eq!(loaded, items);
        }

        it "keeps the item and history keys independent" {
            let store = SqliteStore::open(path.clone()).expect("Failed to open");
            store.migrate().expect("Failed to migrate");
            let gateway = PersistenceGateway::new(store);

            gateway.save_items(&sample_items()).unwrap();
            gateway.save_history(&[]).unwrap();

            assert_eq!(gateway.load_items().unwrap().len(), 3);
            assert!(gateway.load_history().unwrap().is_empty());
        }
    }
}
