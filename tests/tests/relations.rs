use tests::models::{Invoice, InvoiceLine, Order, OrderItem, Person, Profile, User};
use tests::store;

use torpor_core::driver::Operation;

#[tokio::test]
async fn eager_associations_load_with_their_owner() {
    let (db, mut log) = store().await.unwrap();

    let mut session = db.session();
    let mut order = Order::new("A-2001");
    order.items.attach(OrderItem::new("widget", 2));
    order.items.attach(OrderItem::new("gadget", 1));
    session.persist(order).await.unwrap();
    drop(session);
    log.clear();

    let mut session = db.session();
    let order = session.find::<Order>(1).await.unwrap();

    // One read for the order, one query for its items, and the items'
    // back references come out of the identity map for free.
    let items = session.get(&order).unwrap().items.get();
    assert_eq!(items.len(), 2);
    assert_eq!(log.count(|op| matches!(op, Operation::GetByKey(_))), 1);
    assert_eq!(log.count(|op| matches!(op, Operation::QueryByColumn(_))), 1);
    assert_eq!(log.len(), 2);

    for item in items {
        assert_eq!(session.get(&item).unwrap().order.get(), Some(order));
    }
}

#[tokio::test]
async fn lazy_associations_stay_unloaded_after_find() {
    let (db, mut log) = store().await.unwrap();

    let mut session = db.session();
    let mut invoice = Invoice::new("INV-1");
    invoice.lines.attach(InvoiceLine::new("consulting", 1500));
    session.persist(invoice).await.unwrap();
    drop(session);
    log.clear();

    let mut session = db.session();
    let invoice = session.find::<Invoice>(1).await.unwrap();

    assert!(!session.get(&invoice).unwrap().lines.is_loaded());
    assert_eq!(session.get(&invoice).unwrap().lines.try_get(), None);

    // Just the invoice read; the lines were never queried.
    assert_eq!(log.len(), 1);
    assert!(!log.has_query_by_column());
}

#[tokio::test]
async fn lazy_resolution_is_single_shot() {
    let (db, mut log) = store().await.unwrap();

    let mut session = db.session();
    let mut invoice = Invoice::new("INV-2");
    invoice.lines.attach(InvoiceLine::new("design", 800));
    invoice.lines.attach(InvoiceLine::new("build", 2400));
    session.persist(invoice).await.unwrap();
    drop(session);
    log.clear();

    let mut session = db.session();
    let invoice = session.find::<Invoice>(1).await.unwrap();

    let first = session
        .load_many::<_, InvoiceLine>(&invoice, "lines")
        .await
        .unwrap();
    let second = session
        .load_many::<_, InvoiceLine>(&invoice, "lines")
        .await
        .unwrap();

    assert_eq!(first, second);
    assert_eq!(first.len(), 2);
    assert_eq!(log.count(|op| matches!(op, Operation::QueryByColumn(_))), 1);

    // The wrapper now answers without the session.
    assert!(session.get(&invoice).unwrap().lines.is_loaded());
    assert_eq!(session.get(&invoice).unwrap().lines.get().len(), 2);
}

#[tokio::test]
async fn parent_resolution_prefers_the_identity_map() {
    let (db, mut log) = store().await.unwrap();

    let mut session = db.session();
    let mut invoice = Invoice::new("INV-3");
    invoice.lines.attach(InvoiceLine::new("a", 1));
    invoice.lines.attach(InvoiceLine::new("b", 2));
    session.persist(invoice).await.unwrap();
    drop(session);

    let mut session = db.session();
    let first = session.find::<InvoiceLine>(1).await.unwrap();
    let second = session.find::<InvoiceLine>(2).await.unwrap();
    log.clear();

    // The first line pays for the invoice read; the second finds it
    // already managed.
    let parent = session
        .load_parent::<_, Invoice>(&first, "invoice")
        .await
        .unwrap()
        .unwrap();
    let again = session
        .load_parent::<_, Invoice>(&second, "invoice")
        .await
        .unwrap()
        .unwrap();

    assert_eq!(parent, again);
    assert_eq!(log.count(|op| matches!(op, Operation::GetByKey(_))), 1);
}

#[tokio::test]
async fn has_one_resolves_to_at_most_one_row() {
    let (db, mut log) = store().await.unwrap();

    let mut session = db.session();
    let mut user = User::new("alice");
    user.profile.set(Profile::new("hello"));
    session.persist(user).await.unwrap();
    session.persist(User::new("bob")).await.unwrap();
    drop(session);
    log.clear();

    let mut session = db.session();

    let alice = session.find::<User>(1).await.unwrap();
    let profile = session
        .load_one::<_, Profile>(&alice, "profile")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(session.get(&profile).unwrap().bio, "hello");

    // No profile row points at bob.
    let bob = session.find::<User>(2).await.unwrap();
    let missing = session.load_one::<_, Profile>(&bob, "profile").await.unwrap();
    assert_eq!(missing, None);
}

#[tokio::test]
async fn association_lookups_validate_name_and_shape() {
    let (db, _log) = store().await.unwrap();
    let mut session = db.session();

    let mut order = Order::new("A-2002");
    order.items.attach(OrderItem::new("widget", 1));
    let order = session.persist(order).await.unwrap();
    let item = session.get(&order).unwrap().items.get()[0];

    let err = session
        .load_many::<_, OrderItem>(&order, "missing")
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "`Order` has no association named `missing`");

    let err = session
        .load_many::<_, Person>(&order, "items")
        .await
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "association `items` on `Order` targets `OrderItem`, not `Person`"
    );

    let err = session
        .load_many::<_, Order>(&item, "order")
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "association `order` is not to-many");
}
