use choreboard::db::Database;
use speculate2::speculate;

speculate! {
    before {
        let db = Database::open_memory().expect("Failed to create in-memory database");
        db.migrate().expect("Failed to run migrations");
    }

    describe "items" {
        describe "add_item" {
            it "assigns sequential ids starting at 1" {
                assert_eq!(db.add_item("one").expect("Failed to add"), 1);
                assert_eq!(db.add_item("two").expect("Failed to add"), 2);
            }

            it "stores text verbatim" {
                db.add_item("mjölk köpa 牛乳").expect("Failed to add");

                let items = db.list_items().expect("Query failed");
                assert_eq!(items[0].text, "mjölk köpa 牛乳");
            }
        }

        describe "list_items" {
            it "returns empty list when no items exist" {
                let items = db.list_items().expect("Query failed");
                assert!(items.is_empty());
            }

            it "returns items ordered by id" {
                db.add_item("first").expect("Failed to add");
                db.add_item("second").expect("Failed to add");
                db.add_item("third").expect("Failed to add");

                let items = db.list_items().expect("Query failed");
                let texts: Vec<&str> = items.iter().map(|i| i.text.as_str()).collect();
                assert_eq!(texts, vec!["first", "second", "third"]);
                assert!(items.windows(2).all(|w| w[0].id < w[1].id));
            }
        }

        describe "update_item" {
            it "replaces the text wholesale" {
                let id = db.add_item("buy milk").expect("Failed to add");

                let updated = db.update_item(id, "buy milk and eggs").expect("Update failed");
                assert!(updated);

                let items = db.list_items().expect("Query failed");
                assert_eq!(items[0].text, "buy milk and eggs");
            }

            it "returns false for unknown ids" {
                let updated = db.update_item(999, "nope").expect("Update failed");
                assert!(!updated);
                assert!(db.list_items().expect("Query failed").is_empty());
            }
        }

        describe "delete_item" {
            it "removes the item" {
                let id = db.add_item("buy milk").expect("Failed to add");

                let deleted = db.delete_item(id).expect("Delete failed");
                assert!(deleted);
                assert!(db.list_items().expect("Query failed").is_empty());
            }

            it "returns false for unknown ids" {
                let deleted = db.delete_item(999).expect("Delete failed");
                assert!(!deleted);
            }

            it "does not disturb other items" {
                let keep = db.add_item("keep").expect("Failed to add");
                let drop = db.add_item("drop").expect("Failed to add");

                db.delete_item(drop).expect("Delete failed");

                let items = db.list_items().expect("Query failed");
                assert_eq!(items.len(), 1);
                assert_eq!(items[0].id, keep);
            }
        }

        it "does not reuse ids after a delete" {
            let first = db.add_item("one").expect("Failed to add");
            db.delete_item(first).expect("Delete failed");

            let second = db.add_item("two").expect("Failed to add");
            assert!(second > first);
        }
    }
}
