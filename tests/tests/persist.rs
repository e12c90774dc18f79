use tests::models::{Order, OrderItem, Person};
use tests::store;

use torpor::Value;
use torpor_core::driver::Operation;

use pretty_assertions::assert_eq;

#[tokio::test]
async fn generated_keys_are_written_back() {
    let (db, _log) = store().await.unwrap();
    let mut session = db.session();

    let first = session.persist(Person::new("user1", 33)).await.unwrap();
    let second = session.persist(Person::new("user2", 44)).await.unwrap();

    assert_eq!(session.get(&first).unwrap().id, Some(1));
    assert_eq!(session.get(&second).unwrap().id, Some(2));
}

#[tokio::test]
async fn cascading_persist_inserts_owner_then_children() {
    let (db, log) = store().await.unwrap();
    let mut session = db.session();

    let mut order = Order::new("A-1001");
    order.items.attach(OrderItem::new("widget", 2));
    order.items.attach(OrderItem::new("gadget", 1));
    order.items.attach(OrderItem::new("sprocket", 5));

    let order = session.persist(order).await.unwrap();
    let order_id = session.get(&order).unwrap().id.unwrap();

    // One insert for the order, one per item.
    assert_eq!(log.count(|op| matches!(op, Operation::Insert(_))), 4);

    // Every item row went out with the owner's generated key filled in.
    let order_model = db.schema().model_by_name("Order").unwrap().id;
    let item_model = db.schema().model_by_name("OrderItem").unwrap().id;
    log.with_ops(|ops| {
        let inserts: Vec<_> = ops
            .iter()
            .filter_map(|op| match &op.operation {
                Operation::Insert(insert) => Some(insert),
                _ => None,
            })
            .collect();

        assert_eq!(inserts[0].model, order_model);
        for insert in &inserts[1..] {
            assert_eq!(insert.model, item_model);
            assert_eq!(insert.row[1], Value::I64(order_id));
        }
    });

    // The attached values became managed handles.
    let items = session.get(&order).unwrap().items.get();
    assert_eq!(items.len(), 3);
    assert_eq!(session.get(&items[0]).unwrap().order_id, Some(order_id));
}

#[tokio::test]
async fn persisted_children_wire_their_back_reference() {
    let (db, _log) = store().await.unwrap();
    let mut session = db.session();

    let mut order = Order::new("A-1002");
    order.items.attach(OrderItem::new("widget", 2));
    let order = session.persist(order).await.unwrap();

    let item = session.get(&order).unwrap().items.get()[0];
    assert_eq!(session.get(&item).unwrap().order.get(), Some(order));
}

#[tokio::test]
async fn eager_associations_of_new_entities_resolve_in_memory() {
    let (db, log) = store().await.unwrap();
    let mut session = db.session();

    // Nothing was attached, so there is nothing to fetch: a fresh order
    // has no items and a fresh item with a null foreign key has no order.
    let order = session.persist(Order::new("A-1003")).await.unwrap();
    assert_eq!(session.get(&order).unwrap().items.get().len(), 0);

    let item = session.persist(OrderItem::new("widget", 1)).await.unwrap();
    assert_eq!(session.get(&item).unwrap().order.get(), None);

    assert!(!log.has_get_by_key());
    assert!(!log.has_query_by_column());
}

#[tokio::test]
#[should_panic(expected = "cannot attach to a loaded association")]
async fn attaching_to_a_loaded_association_panics() {
    let (db, _log) = store().await.unwrap();
    let mut session = db.session();

    let order = session.persist(Order::new("A-1004")).await.unwrap();

    // The association resolved during persist; attach comes too late.
    session
        .get_mut(&order)
        .unwrap()
        .items
        .attach(OrderItem::new("widget", 1));
}
