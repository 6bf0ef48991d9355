//! Ownership scoping.
//!
//! The role gate decides whether a request may reach a handler at all; this
//! module decides which rows it may touch once there. Two shapes:
//!
//! - list filters: narrow a listing to what the principal owns, so foreign
//!   rows are invisible rather than forbidden;
//! - write checks: a `Result<()>` per (resource, principal) pair, 403 when
//!   the row belongs to someone else.
//!
//! Admins pass every check except review writes, which stay with the
//! authoring customer. Sellers own through their products: an order is
//! theirs when it orders one of their products, a delivery or payment when
//! its order is. Those indirections go through the store's id projections.

use uuid::Uuid;

use crate::db::{DeliveryFilter, OrderFilter, PaymentFilter, ProductFilter, ReviewFilter, Store};
use crate::error::{BazaarError, Result};
use crate::models::{Delivery, Order, Payment, Product, Review};
use crate::rbac::{Principal, Role};

// ═══════════════════════════════════════════════════════════════════════════════
// Account Self-Access
// ═══════════════════════════════════════════════════════════════════════════════

/// Admins may touch any account; everyone else only their own.
pub fn require_self_or_admin(principal: &Principal, account_id: Uuid) -> Result<()> {
    if principal.role == Role::Admin || principal.is_self(account_id) {
        Ok(())
    } else {
        Err(BazaarError::forbidden(
            "Not authorized to access this account",
        ))
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Products
// ═══════════════════════════════════════════════════════════════════════════════

/// Narrow a product listing. Sellers see their own catalog; everyone else,
/// authenticated or not, sees everything.
pub fn product_list_filter(principal: Option<&Principal>) -> ProductFilter {
    let mut filter = ProductFilter::default();
    if let Some(p) = principal {
        if p.role == Role::Seller {
            filter.seller_id = Some(p.id);
        }
    }
    filter
}

pub fn check_product_write(principal: &Principal, product: &Product) -> Result<()> {
    match principal.role {
        Role::Admin => Ok(()),
        Role::Seller if product.seller_id == Some(principal.id) => Ok(()),
        _ => Err(BazaarError::forbidden(
            "Not authorized to modify this product",
        )),
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Orders
// ═══════════════════════════════════════════════════════════════════════════════

/// Narrow an order listing. Customers see their own orders; sellers see
/// orders of their products.
pub async fn order_list_filter(store: &dyn Store, principal: &Principal) -> Result<OrderFilter> {
    let mut filter = OrderFilter::default();
    match principal.role {
        Role::Admin => {}
        Role::Customer => filter.customer_id = Some(principal.id),
        Role::Seller => {
            filter.product_ids = Some(store.product_ids_by_seller(principal.id).await?);
        }
        Role::Deliverer => {
            return Err(BazaarError::forbidden("Not authorized to list orders"));
        }
    }
    Ok(filter)
}

pub async fn check_order_read(
    store: &dyn Store,
    principal: &Principal,
    order: &Order,
) -> Result<()> {
    match principal.role {
        Role::Admin => Ok(()),
        Role::Customer if order.customer_id == principal.id => Ok(()),
        Role::Seller if seller_owns_product(store, principal.id, order.product_id).await? => Ok(()),
        _ => Err(BazaarError::forbidden("Not authorized to access this order")),
    }
}

pub async fn check_order_write(
    store: &dyn Store,
    principal: &Principal,
    order: &Order,
) -> Result<()> {
    match principal.role {
        Role::Admin => Ok(()),
        Role::Seller if seller_owns_product(store, principal.id, order.product_id).await? => Ok(()),
        _ => Err(BazaarError::forbidden("Not authorized to update this order")),
    }
}

async fn seller_owns_product(store: &dyn Store, seller_id: Uuid, product_id: Uuid) -> Result<bool> {
    Ok(store
        .product(product_id)
        .await?
        .is_some_and(|p| p.seller_id == Some(seller_id)))
}

// ═══════════════════════════════════════════════════════════════════════════════
// Deliveries
// ═══════════════════════════════════════════════════════════════════════════════

/// Narrow a delivery listing. Customers see deliveries of their orders,
/// sellers those of orders for their products, deliverers their assignments.
pub async fn delivery_list_filter(
    store: &dyn Store,
    principal: &Principal,
) -> Result<DeliveryFilter> {
    let mut filter = DeliveryFilter::default();
    match principal.role {
        Role::Admin => {}
        Role::Customer => {
            filter.order_ids = Some(store.order_ids_by_customer(principal.id).await?);
        }
        Role::Seller => {
            let product_ids = store.product_ids_by_seller(principal.id).await?;
            filter.order_ids = Some(store.order_ids_for_products(&product_ids).await?);
        }
        Role::Deliverer => filter.deliverer_id = Some(principal.id),
    }
    Ok(filter)
}

pub async fn check_delivery_read(
    store: &dyn Store,
    principal: &Principal,
    delivery: &Delivery,
) -> Result<()> {
    let allowed = match principal.role {
        Role::Admin => true,
        Role::Deliverer => delivery.deliverer_id == Some(principal.id),
        Role::Customer => order_belongs_to_customer(store, principal.id, delivery.order_id).await?,
        Role::Seller => order_is_for_seller(store, principal.id, delivery.order_id).await?,
    };
    if allowed {
        Ok(())
    } else {
        Err(BazaarError::forbidden(
            "Not authorized to access this delivery",
        ))
    }
}

/// Write access to a delivery. Deliverers may only touch assignments that
/// name them; what fields they may change is the handler's concern.
pub fn check_delivery_write(principal: &Principal, delivery: &Delivery) -> Result<()> {
    match principal.role {
        Role::Admin => Ok(()),
        Role::Deliverer if delivery.deliverer_id == Some(principal.id) => Ok(()),
        _ => Err(BazaarError::forbidden(
            "Not authorized to update this delivery",
        )),
    }
}

async fn order_belongs_to_customer(
    store: &dyn Store,
    customer_id: Uuid,
    order_id: Uuid,
) -> Result<bool> {
    Ok(store
        .order(order_id)
        .await?
        .is_some_and(|o| o.customer_id == customer_id))
}

async fn order_is_for_seller(store: &dyn Store, seller_id: Uuid, order_id: Uuid) -> Result<bool> {
    match store.order(order_id).await? {
        Some(order) => seller_owns_product(store, seller_id, order.product_id).await,
        None => Ok(false),
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Reviews
// ═══════════════════════════════════════════════════════════════════════════════

/// Narrow a review listing for `my_reviews` requests.
pub fn review_list_filter(principal: Option<&Principal>, my_reviews: bool) -> ReviewFilter {
    let mut filter = ReviewFilter::default();
    if my_reviews {
        if let Some(p) = principal {
            if p.role == Role::Customer {
                filter.customer_id = Some(p.id);
            }
        }
    }
    filter
}

/// Reviews stay with their author: not even admins may rewrite them.
pub fn check_review_write(principal: &Principal, review: &Review) -> Result<()> {
    match principal.role {
        Role::Customer if review.customer_id == principal.id => Ok(()),
        _ => Err(BazaarError::forbidden(
            "Not authorized to modify this review",
        )),
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Payments
// ═══════════════════════════════════════════════════════════════════════════════

/// Narrow a payment listing. Customers see their own payments, sellers the
/// payments of orders for their products.
pub async fn payment_list_filter(
    store: &dyn Store,
    principal: &Principal,
) -> Result<PaymentFilter> {
    let mut filter = PaymentFilter::default();
    match principal.role {
        Role::Admin => {}
        Role::Customer => filter.customer_id = Some(principal.id),
        Role::Seller => {
            let product_ids = store.product_ids_by_seller(principal.id).await?;
            filter.order_ids = Some(store.order_ids_for_products(&product_ids).await?);
        }
        Role::Deliverer => {
            return Err(BazaarError::forbidden("Not authorized to list payments"));
        }
    }
    Ok(filter)
}

pub async fn check_payment_read(
    store: &dyn Store,
    principal: &Principal,
    payment: &Payment,
) -> Result<()> {
    let allowed = match principal.role {
        Role::Admin => true,
        Role::Customer => payment.customer_id == principal.id,
        Role::Seller => order_is_for_seller(store, principal.id, payment.order_id).await?,
        Role::Deliverer => false,
    };
    if allowed {
        Ok(())
    } else {
        Err(BazaarError::forbidden(
            "Not authorized to access this payment",
        ))
    }
}

pub fn check_payment_write(principal: &Principal, payment: &Payment) -> Result<()> {
    match principal.role {
        Role::Admin => Ok(()),
        Role::Customer if payment.customer_id == principal.id => Ok(()),
        _ => Err(BazaarError::forbidden(
            "Not authorized to update this payment",
        )),
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;
    use crate::error::ErrorCode;
    use crate::models::PaymentMethod;
    use chrono::{Duration, Utc};

    fn principal(role: Role) -> Principal {
        Principal {
            id: Uuid::new_v4(),
            role,
            name: "Test".to_string(),
            email: "test@example.com".to_string(),
            approval: None,
            token_id: Uuid::new_v4().to_string(),
            token_expires_at: Utc::now() + Duration::hours(1),
        }
    }

    fn order_for(customer_id: Uuid, product_id: Uuid) -> Order {
        Order::new(customer_id, product_id, 1, 10.0)
    }

    #[test]
    fn test_self_or_admin() {
        let admin = principal(Role::Admin);
        let customer = principal(Role::Customer);

        assert!(require_self_or_admin(&admin, Uuid::new_v4()).is_ok());
        assert!(require_self_or_admin(&customer, customer.id).is_ok());

        let err = require_self_or_admin(&customer, Uuid::new_v4()).unwrap_err();
        assert_eq!(err.code(), ErrorCode::Forbidden);
    }

    #[test]
    fn test_product_list_filter_narrows_sellers_only() {
        let seller = principal(Role::Seller);
        assert_eq!(product_list_filter(Some(&seller)).seller_id, Some(seller.id));

        let customer = principal(Role::Customer);
        assert_eq!(product_list_filter(Some(&customer)).seller_id, None);
        assert_eq!(product_list_filter(None).seller_id, None);
    }

    #[test]
    fn test_product_write_check() {
        let seller = principal(Role::Seller);
        let other = principal(Role::Seller);
        let product = Product::new(
            "Lamp".to_string(),
            "A lamp".to_string(),
            25.0,
            0.0,
            seller.id,
        );

        assert!(check_product_write(&seller, &product).is_ok());
        assert!(check_product_write(&principal(Role::Admin), &product).is_ok());
        assert!(check_product_write(&other, &product).is_err());
        assert!(check_product_write(&principal(Role::Customer), &product).is_err());
    }

    #[tokio::test]
    async fn test_order_list_filter_per_role() {
        let store = MemoryStore::new();
        let seller = principal(Role::Seller);
        let product = Product::new(
            "Lamp".to_string(),
            "A lamp".to_string(),
            25.0,
            0.0,
            seller.id,
        );
        store.insert_product(&product).await.unwrap();

        let admin_filter = order_list_filter(&store, &principal(Role::Admin))
            .await
            .unwrap();
        assert!(admin_filter.customer_id.is_none());
        assert!(admin_filter.product_ids.is_none());

        let customer = principal(Role::Customer);
        let customer_filter = order_list_filter(&store, &customer).await.unwrap();
        assert_eq!(customer_filter.customer_id, Some(customer.id));

        let seller_filter = order_list_filter(&store, &seller).await.unwrap();
        assert_eq!(seller_filter.product_ids, Some(vec![product.id]));

        let err = order_list_filter(&store, &principal(Role::Deliverer))
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::Forbidden);
    }

    #[tokio::test]
    async fn test_order_read_check() {
        let store = MemoryStore::new();
        let customer = principal(Role::Customer);
        let seller = principal(Role::Seller);
        let product = Product::new(
            "Lamp".to_string(),
            "A lamp".to_string(),
            25.0,
            0.0,
            seller.id,
        );
        store.insert_product(&product).await.unwrap();
        let order = order_for(customer.id, product.id);

        assert!(check_order_read(&store, &customer, &order).await.is_ok());
        assert!(check_order_read(&store, &seller, &order).await.is_ok());

        let stranger = principal(Role::Customer);
        let err = check_order_read(&store, &stranger, &order)
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::Forbidden);

        let other_seller = principal(Role::Seller);
        assert!(check_order_read(&store, &other_seller, &order)
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_delivery_scoping() {
        let store = MemoryStore::new();
        let deliverer = principal(Role::Deliverer);
        let customer = principal(Role::Customer);
        let seller = principal(Role::Seller);

        let product = Product::new(
            "Lamp".to_string(),
            "A lamp".to_string(),
            25.0,
            0.0,
            seller.id,
        );
        store.insert_product(&product).await.unwrap();
        let order = order_for(customer.id, product.id);
        store.insert_order(&order).await.unwrap();

        let delivery = Delivery::new(order.id, Some(deliverer.id), "12 Elm Street".to_string());

        assert!(check_delivery_read(&store, &deliverer, &delivery)
            .await
            .is_ok());
        assert!(check_delivery_read(&store, &customer, &delivery)
            .await
            .is_ok());
        assert!(check_delivery_read(&store, &seller, &delivery)
            .await
            .is_ok());

        let other_deliverer = principal(Role::Deliverer);
        assert!(check_delivery_read(&store, &other_deliverer, &delivery)
            .await
            .is_err());

        // Writes: only admin or the assigned deliverer.
        assert!(check_delivery_write(&deliverer, &delivery).is_ok());
        assert!(check_delivery_write(&principal(Role::Admin), &delivery).is_ok());
        assert!(check_delivery_write(&other_deliverer, &delivery).is_err());
        assert!(check_delivery_write(&customer, &delivery).is_err());

        let deliverer_filter = delivery_list_filter(&store, &deliverer).await.unwrap();
        assert_eq!(deliverer_filter.deliverer_id, Some(deliverer.id));

        let customer_filter = delivery_list_filter(&store, &customer).await.unwrap();
        assert_eq!(customer_filter.order_ids, Some(vec![order.id]));
    }

    #[test]
    fn test_review_write_check() {
        let customer = principal(Role::Customer);
        let review = Review::new(
            customer.id,
            Uuid::new_v4(),
            Uuid::new_v4(),
            5,
            "Great".to_string(),
        );

        assert!(check_review_write(&customer, &review).is_ok());
        assert!(check_review_write(&principal(Role::Customer), &review).is_err());
        assert!(check_review_write(&principal(Role::Seller), &review).is_err());
        // Reviews are author-owned; admins only read them.
        assert!(check_review_write(&principal(Role::Admin), &review).is_err());
    }

    #[test]
    fn test_review_list_filter_my_reviews() {
        let customer = principal(Role::Customer);

        let mine = review_list_filter(Some(&customer), true);
        assert_eq!(mine.customer_id, Some(customer.id));

        // Anonymous or not-asked-for stays unfiltered.
        assert_eq!(review_list_filter(None, true).customer_id, None);
        assert_eq!(review_list_filter(Some(&customer), false).customer_id, None);
    }

    #[tokio::test]
    async fn test_payment_scoping() {
        let store = MemoryStore::new();
        let customer = principal(Role::Customer);
        let seller = principal(Role::Seller);

        let product = Product::new(
            "Lamp".to_string(),
            "A lamp".to_string(),
            25.0,
            0.0,
            seller.id,
        );
        store.insert_product(&product).await.unwrap();
        let order = order_for(customer.id, product.id);
        store.insert_order(&order).await.unwrap();

        let payment = Payment::new(customer.id, order.id, PaymentMethod::Upi);

        assert!(check_payment_read(&store, &customer, &payment)
            .await
            .is_ok());
        assert!(check_payment_read(&store, &seller, &payment).await.is_ok());
        assert!(check_payment_read(&store, &principal(Role::Customer), &payment)
            .await
            .is_err());

        assert!(check_payment_write(&customer, &payment).is_ok());
        assert!(check_payment_write(&principal(Role::Seller), &payment).is_err());

        let seller_filter = payment_list_filter(&store, &seller).await.unwrap();
        assert_eq!(seller_filter.order_ids, Some(vec![order.id]));

        let err = payment_list_filter(&store, &principal(Role::Deliverer))
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::Forbidden);
    }
}
