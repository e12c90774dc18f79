//! Entity types shared by the integration suite.
//!
//! `Order`/`OrderItem` form a cyclic eager pair, `Invoice`/`InvoiceLine`
//! the lazy equivalent, `User`/`Profile` a lazy to-one pair, and `Tag`
//! carries an application-assigned key.

use torpor::{
    relation::{BelongsTo, HasMany, HasOne},
    schema::{Fetch, Type},
    Entity, EntityDescriptor,
};

#[derive(Debug, Default)]
pub struct Person {
    pub id: Option<i64>,
    pub name: String,
    pub age: i64,
    pub email: Option<String>,
}

impl Person {
    pub fn new(name: &str, age: i64) -> Person {
        Person {
            id: None,
            name: name.into(),
            age,
            email: None,
        }
    }
}

impl Entity for Person {
    fn descriptor() -> EntityDescriptor<Self> {
        EntityDescriptor::<Person>::new("Person", "people")
            .auto_key(
                "id",
                |person| person.id.into(),
                |person, value| {
                    person.id = value.to_option_i64()?;
                    Ok(())
                },
            )
            .column(
                "name",
                Type::Text,
                |person| person.name.as_str().into(),
                |person, value| {
                    person.name = value.to_string()?;
                    Ok(())
                },
            )
            .column(
                "age",
                Type::I64,
                |person| person.age.into(),
                |person, value| {
                    person.age = value.to_i64()?;
                    Ok(())
                },
            )
            .nullable_column(
                "email",
                Type::Text,
                |person| person.email.clone().into(),
                |person, value| {
                    person.email = value.to_option_string()?;
                    Ok(())
                },
            )
    }
}

#[derive(Debug, Default)]
pub struct Order {
    pub id: Option<i64>,
    pub order_number: String,
    pub items: HasMany<OrderItem>,
}

impl Order {
    pub fn new(order_number: &str) -> Order {
        Order {
            id: None,
            order_number: order_number.into(),
            items: HasMany::new(),
        }
    }
}

impl Entity for Order {
    fn descriptor() -> EntityDescriptor<Self> {
        EntityDescriptor::<Order>::new("Order", "orders")
            .auto_key(
                "id",
                |order| order.id.into(),
                |order, value| {
                    order.id = value.to_option_i64()?;
                    Ok(())
                },
            )
            .column(
                "order_number",
                Type::Text,
                |order| order.order_number.as_str().into(),
                |order, value| {
                    order.order_number = value.to_string()?;
                    Ok(())
                },
            )
            .has_many::<OrderItem>(
                "items",
                "OrderItem",
                "order_id",
                Fetch::Eager,
                |order| &order.items,
                |order| &mut order.items,
            )
    }
}

#[derive(Debug, Default)]
pub struct OrderItem {
    pub id: Option<i64>,
    pub order_id: Option<i64>,
    pub product: String,
    pub quantity: i64,
    pub order: BelongsTo<Order>,
}

impl OrderItem {
    pub fn new(product: &str, quantity: i64) -> OrderItem {
        OrderItem {
            id: None,
            order_id: None,
            product: product.into(),
            quantity,
            order: BelongsTo::new(),
        }
    }
}

impl Entity for OrderItem {
    fn descriptor() -> EntityDescriptor<Self> {
        EntityDescriptor::<OrderItem>::new("OrderItem", "order_items")
            .auto_key(
                "id",
                |item| item.id.into(),
                |item, value| {
                    item.id = value.to_option_i64()?;
                    Ok(())
                },
            )
            .nullable_column(
                "order_id",
                Type::I64,
                |item| item.order_id.into(),
                |item, value| {
                    item.order_id = value.to_option_i64()?;
                    Ok(())
                },
            )
            .column(
                "product",
                Type::Text,
                |item| item.product.as_str().into(),
                |item, value| {
                    item.product = value.to_string()?;
                    Ok(())
                },
            )
            .column(
                "quantity",
                Type::I64,
                |item| item.quantity.into(),
                |item, value| {
                    item.quantity = value.to_i64()?;
                    Ok(())
                },
            )
            .belongs_to::<Order>(
                "order",
                "Order",
                "order_id",
                Fetch::Eager,
                |item| &item.order,
                |item| &mut item.order,
            )
    }
}

#[derive(Debug, Default)]
pub struct Invoice {
    pub id: Option<i64>,
    pub number: String,
    pub lines: HasMany<InvoiceLine>,
}

impl Invoice {
    pub fn new(number: &str) -> Invoice {
        Invoice {
            id: None,
            number: number.into(),
            lines: HasMany::new(),
        }
    }
}

impl Entity for Invoice {
    fn descriptor() -> EntityDescriptor<Self> {
        EntityDescriptor::<Invoice>::new("Invoice", "invoices")
            .auto_key(
                "id",
                |invoice| invoice.id.into(),
                |invoice, value| {
                    invoice.id = value.to_option_i64()?;
                    Ok(())
                },
            )
            .column(
                "number",
                Type::Text,
                |invoice| invoice.number.as_str().into(),
                |invoice, value| {
                    invoice.number = value.to_string()?;
                    Ok(())
                },
            )
            .has_many::<InvoiceLine>(
                "lines",
                "InvoiceLine",
                "invoice_id",
                Fetch::Lazy,
                |invoice| &invoice.lines,
                |invoice| &mut invoice.lines,
            )
    }
}

#[derive(Debug, Default)]
pub struct InvoiceLine {
    pub id: Option<i64>,
    pub invoice_id: Option<i64>,
    pub description: String,
    pub amount: i64,
    pub invoice: BelongsTo<Invoice>,
}

impl InvoiceLine {
    pub fn new(description: &str, amount: i64) -> InvoiceLine {
        InvoiceLine {
            id: None,
            invoice_id: None,
            description: description.into(),
            amount,
            invoice: BelongsTo::new(),
        }
    }
}

impl Entity for InvoiceLine {
    fn descriptor() -> EntityDescriptor<Self> {
        EntityDescriptor::<InvoiceLine>::new("InvoiceLine", "invoice_lines")
            .auto_key(
                "id",
                |line| line.id.into(),
                |line, value| {
                    line.id = value.to_option_i64()?;
                    Ok(())
                },
            )
            .nullable_column(
                "invoice_id",
                Type::I64,
                |line| line.invoice_id.into(),
                |line, value| {
                    line.invoice_id = value.to_option_i64()?;
                    Ok(())
                },
            )
            .column(
                "description",
                Type::Text,
                |line| line.description.as_str().into(),
                |line, value| {
                    line.description = value.to_string()?;
                    Ok(())
                },
            )
            .column(
                "amount",
                Type::I64,
                |line| line.amount.into(),
                |line, value| {
                    line.amount = value.to_i64()?;
                    Ok(())
                },
            )
            .belongs_to::<Invoice>(
                "invoice",
                "Invoice",
                "invoice_id",
                Fetch::Lazy,
                |line| &line.invoice,
                |line| &mut line.invoice,
            )
    }
}

#[derive(Debug, Default)]
pub struct User {
    pub id: Option<i64>,
    pub username: String,
    pub profile: HasOne<Profile>,
}

impl User {
    pub fn new(username: &str) -> User {
        User {
            id: None,
            username: username.into(),
            profile: HasOne::new(),
        }
    }
}

impl Entity for User {
    fn descriptor() -> EntityDescriptor<Self> {
        EntityDescriptor::<User>::new("User", "users")
            .auto_key(
                "id",
                |user| user.id.into(),
                |user, value| {
                    user.id = value.to_option_i64()?;
                    Ok(())
                },
            )
            .column(
                "username",
                Type::Text,
                |user| user.username.as_str().into(),
                |user, value| {
                    user.username = value.to_string()?;
                    Ok(())
                },
            )
            .has_one::<Profile>(
                "profile",
                "Profile",
                "user_id",
                Fetch::Lazy,
                |user| &user.profile,
                |user| &mut user.profile,
            )
    }
}

/// One-way pair: the profile carries the foreign key but declares no
/// association back.
#[derive(Debug, Default)]
pub struct Profile {
    pub id: Option<i64>,
    pub user_id: Option<i64>,
    pub bio: String,
}

impl Profile {
    pub fn new(bio: &str) -> Profile {
        Profile {
            id: None,
            user_id: None,
            bio: bio.into(),
        }
    }
}

impl Entity for Profile {
    fn descriptor() -> EntityDescriptor<Self> {
        EntityDescriptor::<Profile>::new("Profile", "profiles")
            .auto_key(
                "id",
                |profile| profile.id.into(),
                |profile, value| {
                    profile.id = value.to_option_i64()?;
                    Ok(())
                },
            )
            .nullable_column(
                "user_id",
                Type::I64,
                |profile| profile.user_id.into(),
                |profile, value| {
                    profile.user_id = value.to_option_i64()?;
                    Ok(())
                },
            )
            .column(
                "bio",
                Type::Text,
                |profile| profile.bio.as_str().into(),
                |profile, value| {
                    profile.bio = value.to_string()?;
                    Ok(())
                },
            )
    }
}

/// Application-assigned key; the store never allocates it.
#[derive(Debug, Default)]
pub struct Tag {
    pub slug: String,
    pub label: String,
}

impl Tag {
    pub fn new(slug: &str, label: &str) -> Tag {
        Tag {
            slug: slug.into(),
            label: label.into(),
        }
    }
}

impl Entity for Tag {
    fn descriptor() -> EntityDescriptor<Self> {
        EntityDescriptor::<Tag>::new("Tag", "tags")
            .key(
                "slug",
                Type::Text,
                |tag| tag.slug.as_str().into(),
                |tag, value| {
                    tag.slug = value.to_string()?;
                    Ok(())
                },
            )
            .column(
                "label",
                Type::Text,
                |tag| tag.label.as_str().into(),
                |tag, value| {
                    tag.label = value.to_string()?;
                    Ok(())
                },
            )
    }
}
