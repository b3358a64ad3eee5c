use quotebook::error::BudgetError;
use quotebook::items::ItemStore;
use quotebook::models::*;
use quotebook::session::{EditSession, EditState};
use speculate2::speculate;
use uuid::Uuid;

fn consulting() -> ItemInput {
    ItemInput::new("Consulting", 2.0, 100.0, 10.0)
}

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

speculate! {
    before {
        let mut store = ItemStore::new();
    }

    describe "item_store" {
        describe "add" {
            it "computes the discounted subtotal" {
                let item = store.add(consulting()).expect("Failed to add");

                assert_eq!(item.description(), "Consulting");
                assert!(close(item.subtotal(), 180.0));
                assert_eq!(store.len(), 1);
            }

            it "treats discounts over 100 as 100 but stores them as entered" {
                let item = store
                    .add(ItemInput::new("Giveaway", 1.0, 50.0, 150.0))
                    .expect("Failed to add");

                assert_eq!(item.subtotal(), 0.0);
                assert_eq!(item.discount_percent(), 150.0);
            }

            it "rejects a blank description and leaves the store untouched" {
                let result = store.add(ItemInput::new("   ", 1.0, 10.0, 0.0));

                assert!(matches!(result, Err(BudgetError::Validation(_))));
                assert!(store.is_empty());
            }

            it "gives distinct ids to items added back to back" {
                let ids: std::collections::HashSet<Uuid> = (0..500)
                    .map(|_| store.add(consulting()).expect("Failed to add").id())
                    .collect();

                assert_eq!(ids.len(), 500);
            }

            it "keeps insertion order" {
                store.add(ItemInput::new("First", 1.0, 1.0, 0.0)).unwrap();
                store.add(ItemInput::new("Second", 1.0, 1.0, 0.0)).unwrap();
                store.add(ItemInput::new("Third", 1.0, 1.0, 0.0)).unwrap();

                let names: Vec<String> = store.list().iter().map(|i| i.description().to_string()).collect();
                assert_eq!(names, vec!["First", "Second", "Third"]);
            }
        }

        describe "update" {
            it "merges fields recomputes and keeps position" {
                let first = store.add(ItemInput::new("First", 1.0, 10.0, 0.0)).unwrap();
                store.add(ItemInput::new("Second", 1.0, 20.0, 0.0)).unwrap();

                let updated = store.update(first.id(), UpdateItemInput {
                    quantity: Some(3.0),
                    discount_percent: Some(50.0),
                    ..Default::default()
                }).expect("Failed to update");

                assert_eq!(updated.description(), "First");
                assert!(close(updated.subtotal(), 15.0));
                assert_eq!(store.list()[0].id(), first.id());
                assert_eq!(store.list()[0], updated);
            }

            it "fails for an unknown id" {
                let result = store.update(Uuid::new_v4(), UpdateItemInput::default());
                assert!(matches!(result, Err(BudgetError::NotFound(_))));
            }

            it "rejects a blank description without applying other fields" {
                let item = store.add(consulting()).unwrap();

                let result = store.update(item.id(), UpdateItemInput {
                    description: Some("".to_string()),
                    quantity: Some(99.0),
                    ..Default::default()
                });

                assert!(matches!(result, Err(BudgetError::Validation(_))));
                assert_eq!(store.get(item.id()), Some(item));
            }
        }

        describe "remove" {
            it "removes an existing item" {
                let item = store.add(consulting()).unwrap();

                assert!(store.remove(item.id()));
                assert!(store.is_empty());
            }

            it "is a noop for an absent id every time" {
                store.add(consulting()).unwrap();
                let missing = Uuid::new_v4();

                assert!(!store.remove(missing));
                assert!(!store.remove(missing));
                assert_eq!(store.len(), 1);
            }
        }

        describe "list" {
            it "returns copies the caller cannot use to change the store" {
                store.add(consulting()).unwrap();
                let mut copy = store.list();
                copy.clear();

                assert_eq!(store.len(), 1);
            }
        }

        describe "clear" {
            it "empties the collection" {
                store.add(consulting()).unwrap();
                store.add(consulting()).unwrap();
                store.clear();

                assert!(store.is_empty());
            }
        }
    }

    describe "edit_session" {
        before {
            let mut session = EditSession::new();
        }

        it "starts idle" {
            assert_eq!(session.state(), EditState::Idle);
        }

        it "adds a new item when idle" {
            let item = session.submit(&mut store, consulting()).expect("Failed to submit");

            assert_eq!(store.list(), vec![item]);
            assert_eq!(session.state(), EditState::Idle);
        }

        it "returns the item values when an edit begins" {
            let item = store.add(consulting()).unwrap();

            let form = session.begin(&store, item.id()).expect("Failed to begin");

            assert_eq!(form, consulting());
            assert_eq!(session.state(), EditState::Editing(item.id()));
        }

        it "replaces the edited item and goes back to idle" {
            let item = store.add(consulting()).unwrap();
            session.begin(&store, item.id()).unwrap();

            let updated = session
                .submit(&mut store, ItemInput::new("Consulting (senior)", 3.0, 120.0, 0.0))
                .expect("Failed to submit");

            assert_eq!(updated.id(), item.id());
            assert_eq!(store.len(), 1);
            assert_eq!(store.list()[0].description(), "Consulting (senior)");
            assert!(close(store.list()[0].subtotal(), 360.0));
            assert_eq!(session.state(), EditState::Idle);
        }

        it "fails to begin on an unknown id and stays idle" {
            let result = session.begin(&store, Uuid::new_v4());

            assert!(matches!(result, Err(BudgetError::NotFound(_))));
            assert_eq!(session.state(), EditState::Idle);
        }

        it "retargets when begin is called twice" {
            let a = store.add(ItemInput::new("A", 1.0, 1.0, 0.0)).unwrap();
            let b = store.add(ItemInput::new("B", 1.0, 1.0, 0.0)).unwrap();

            session.begin(&store, a.id()).unwrap();
            session.begin(&store, b.id()).unwrap();
            session.submit(&mut store, ItemInput::new("B2", 1.0, 1.0, 0.0)).unwrap();

            let names: Vec<String> = store.list().iter().map(|i| i.description().to_string()).collect();
            assert_eq!(names, vec!["A", "B2"]);
        }

        it "stays in edit mode when the submit is rejected" {
            let item = store.add(consulting()).unwrap();
            session.begin(&store, item.id()).unwrap();

            let result = session.submit(&mut store, ItemInput::new("", 1.0, 1.0, 0.0));

            assert!(result.is_err());
            assert_eq!(session.state(), EditState::Editing(item.id()));
        }

        it "cancel returns to idle without touching the store" {
            let item = store.add(consulting()).unwrap();
            session.begin(&store, item.id()).unwrap();
            session.cancel();

            assert_eq!(session.state(), EditState::Idle);
            assert_eq!(store.list(), vec![item]);
        }
    }
}
