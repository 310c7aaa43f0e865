//! Cart and order engine.
//!
//! Each operation loads the user document, changes the cart or order list in
//! memory, and writes back only those fields in a single update. A failed
//! write leaves the stored document as it was.
//!
//! A product counts as sold once it appears in anyone's order history; sold
//! products cannot be bought again. The check and the write are separate
//! store calls, so two buyers racing for the same product can both succeed.

use chrono::{DateTime, Duration, Utc};
use thiserror::Error;

use emporium_core::{OrderId, PaymentMethod, Price, PriceError, ProductId, UserId};

use crate::db::{Store, StoreError, UserKey, UserUpdate};
use crate::models::{CartLine, Order, Product, Receipt, User};

/// An empty-cart checkout within this window of the last order returns that
/// order again instead of failing.
const RESUBMIT_WINDOW_SECS: i64 = 10;

/// Errors from cart and order operations.
#[derive(Debug, Error)]
pub enum CartError {
    #[error("product not found")]
    ProductNotFound,

    #[error("user not found")]
    UserNotFound,

    #[error("product already in cart")]
    DuplicateInCart,

    #[error("product not in cart")]
    ItemNotFound,

    #[error("cart is empty")]
    EmptyCart,

    #[error("product has already been sold")]
    AlreadySold,

    #[error("order total overflowed")]
    TotalOverflow,

    /// The store accepted the call but changed nothing.
    #[error("update was not applied")]
    PersistError,

    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

impl From<PriceError> for CartError {
    fn from(_: PriceError) -> Self {
        Self::TotalOverflow
    }
}

/// Cart and order engine.
pub struct CartService<'a> {
    store: &'a dyn Store,
}

impl<'a> CartService<'a> {
    #[must_use]
    pub const fn new(store: &'a dyn Store) -> Self {
        Self { store }
    }

    /// Add a snapshot of a product to the user's cart.
    ///
    /// Returns the product id, which doubles as the cart line id.
    ///
    /// # Errors
    ///
    /// `ProductNotFound`, `UserNotFound`, `DuplicateInCart`, `PersistError`.
    pub async fn add_to_cart(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<ProductId, CartError> {
        let product = self.product(product_id).await?;
        let user = self.user(user_id).await?;

        if user.cart_position(product_id).is_some() {
            return Err(CartError::DuplicateInCart);
        }

        let mut cart = user.user_cart;
        cart.push(CartLine::from(&product));
        self.persist(user_id, UserUpdate::default().cart(cart)).await?;

        tracing::debug!(%user_id, %product_id, "Added to cart");
        Ok(product_id)
    }

    /// Remove a product's line from the user's cart.
    ///
    /// # Errors
    ///
    /// `UserNotFound`, `ItemNotFound`, `PersistError`.
    pub async fn remove_from_cart(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<(), CartError> {
        let user = self.user(user_id).await?;
        let position = user
            .cart_position(product_id)
            .ok_or(CartError::ItemNotFound)?;

        let mut cart = user.user_cart;
        cart.remove(position);
        self.persist(user_id, UserUpdate::default().cart(cart)).await?;

        tracing::debug!(%user_id, %product_id, "Removed from cart");
        Ok(())
    }

    /// The user's cart lines in the order they were added.
    ///
    /// # Errors
    ///
    /// `UserNotFound`.
    pub async fn get_cart(&self, user_id: UserId) -> Result<Vec<CartLine>, CartError> {
        Ok(self.user(user_id).await?.user_cart)
    }

    /// Turn the whole cart into one order and empty the cart.
    ///
    /// An empty cart shortly after a successful checkout is treated as a
    /// resubmission and returns the previous order.
    ///
    /// # Errors
    ///
    /// `UserNotFound`, `EmptyCart`, `AlreadySold`, `TotalOverflow`,
    /// `PersistError`.
    pub async fn checkout(
        &self,
        user_id: UserId,
        payment: Option<PaymentMethod>,
    ) -> Result<Receipt, CartError> {
        self.checkout_at(user_id, payment, Utc::now()).await
    }

    async fn checkout_at(
        &self,
        user_id: UserId,
        payment: Option<PaymentMethod>,
        now: DateTime<Utc>,
    ) -> Result<Receipt, CartError> {
        let user = self.user(user_id).await?;

        if user.user_cart.is_empty() {
            return match user.last_order() {
                Some(order) if now - order.ordered_on < Duration::seconds(RESUBMIT_WINDOW_SECS) => {
                    tracing::info!(%user_id, order_id = %order.order_id, "Checkout resubmitted");
                    Ok(Receipt::from(order))
                }
                _ => Err(CartError::EmptyCart),
            };
        }

        self.ensure_unsold(user.user_cart.iter().map(|line| line.product_id))
            .await?;

        let total = Price::total(user.user_cart.iter().map(|line| line.price))?;
        let order = Order {
            order_id: OrderId::generate(),
            order_list: user.user_cart,
            ordered_on: now,
            total_price: total,
            discount: Price::ZERO,
            payment_method: payment.unwrap_or_default(),
        };
        let receipt = Receipt::from(&order);

        let mut orders = user.order_status;
        orders.push(order);
        self.persist(
            user_id,
            UserUpdate::default().cart(Vec::new()).orders(orders),
        )
        .await?;

        tracing::info!(%user_id, order_id = %receipt.order_id, total = %receipt.total_price, "Order placed");
        Ok(receipt)
    }

    /// Buy a single product directly, leaving the cart untouched.
    ///
    /// # Errors
    ///
    /// `ProductNotFound`, `UserNotFound`, `AlreadySold`, `PersistError`.
    pub async fn instant_buy(
        &self,
        user_id: UserId,
        product_id: ProductId,
        payment: Option<PaymentMethod>,
    ) -> Result<Receipt, CartError> {
        let product = self.product(product_id).await?;
        let user = self.user(user_id).await?;
        self.ensure_unsold([product_id]).await?;

        let order = Order {
            order_id: OrderId::generate(),
            order_list: vec![CartLine::from(&product)],
            ordered_on: Utc::now(),
            total_price: product.price,
            discount: Price::ZERO,
            payment_method: payment.unwrap_or_default(),
        };
        let receipt = Receipt::from(&order);

        let mut orders = user.order_status;
        orders.push(order);
        self.persist(user_id, UserUpdate::default().orders(orders))
            .await?;

        tracing::info!(%user_id, %product_id, order_id = %receipt.order_id, "Instant buy");
        Ok(receipt)
    }

    async fn user(&self, user_id: UserId) -> Result<User, CartError> {
        self.store
            .find_user(UserKey::Id(user_id))
            .await?
            .ok_or(CartError::UserNotFound)
    }

    async fn product(&self, product_id: ProductId) -> Result<Product, CartError> {
        self.store
            .find_product(product_id)
            .await?
            .ok_or(CartError::ProductNotFound)
    }

    async fn ensure_unsold<I>(&self, product_ids: I) -> Result<(), CartError>
    where
        I: IntoIterator<Item = ProductId>,
    {
        let sold = self.store.sold_product_ids().await?;
        if product_ids.into_iter().any(|id| sold.contains(&id)) {
            return Err(CartError::AlreadySold);
        }
        Ok(())
    }

    async fn persist(&self, user_id: UserId, update: UserUpdate) -> Result<(), CartError> {
        let outcome = self.store.update_user(user_id, update).await?;
        if !outcome.applied() {
            tracing::warn!(%user_id, ?outcome, "User update not applied");
            return Err(CartError::PersistError);
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use emporium_core::{Email, Phone};

    use super::*;
    use crate::db::MemoryStore;
    use crate::db::testing::StaleStore;

    struct Fixture {
        store: MemoryStore,
        user_id: UserId,
    }

    impl Fixture {
        async fn new() -> Self {
            let store = MemoryStore::new();
            let user_id = insert_user(&store, "shopper@example.com", "5550001").await;
            Self { store, user_id }
        }

        fn cart(&self) -> CartService<'_> {
            CartService::new(&self.store)
        }

        async fn product(&self, name: &str, price: i64) -> ProductId {
            let product = Product {
                product_id: ProductId::generate(),
                product_name: name.into(),
                price: Price::new(price).unwrap(),
                rating: 4,
                image: format!("/img/{name}.png"),
            };
            self.store.insert_product(&product).await.unwrap();
            product.product_id
        }

        async fn stored_user(&self) -> User {
            self.store
                .find_user(UserKey::Id(self.user_id))
                .await
                .unwrap()
                .unwrap()
        }
    }

    async fn insert_user(store: &MemoryStore, email: &str, phone: &str) -> UserId {
        let now = Utc::now();
        let user = User {
            user_id: UserId::generate(),
            first_name: "Shop".into(),
            last_name: "Per".into(),
            email: Email::parse(email).unwrap(),
            phone: Phone::parse(phone).unwrap(),
            password: String::new(),
            is_admin: false,
            token: String::new(),
            refresh_token: String::new(),
            created_at: now,
            updated_at: now,
            address_details: Vec::new(),
            user_cart: Vec::new(),
            order_status: Vec::new(),
        };
        store.insert_user(&user).await.unwrap();
        user.user_id
    }

    #[tokio::test]
    async fn test_add_snapshots_product() {
        let fx = Fixture::new().await;
        let mug = fx.product("mug", 250).await;

        let line_id = fx.cart().add_to_cart(fx.user_id, mug).await.unwrap();
        assert_eq!(line_id, mug);

        let cart = fx.cart().get_cart(fx.user_id).await.unwrap();
        assert_eq!(cart.len(), 1);
        assert_eq!(cart[0].product_name, "mug");
        assert_eq!(cart[0].price.amount(), 250);
        assert_eq!(cart[0].image, "/img/mug.png");
    }

    #[tokio::test]
    async fn test_adding_twice_is_rejected() {
        let fx = Fixture::new().await;
        let mug = fx.product("mug", 250).await;
        fx.cart().add_to_cart(fx.user_id, mug).await.unwrap();

        let again = fx.cart().add_to_cart(fx.user_id, mug).await;
        assert!(matches!(again, Err(CartError::DuplicateInCart)));
        assert_eq!(fx.cart().get_cart(fx.user_id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_add_unknown_product_or_user() {
        let fx = Fixture::new().await;
        let mug = fx.product("mug", 250).await;

        let no_product = fx.cart().add_to_cart(fx.user_id, ProductId::generate()).await;
        assert!(matches!(no_product, Err(CartError::ProductNotFound)));

        let no_user = fx.cart().add_to_cart(UserId::generate(), mug).await;
        assert!(matches!(no_user, Err(CartError::UserNotFound)));
    }

    #[tokio::test]
    async fn test_remove_keeps_order_of_others() {
        let fx = Fixture::new().await;
        let a = fx.product("a", 1).await;
        let b = fx.product("b", 2).await;
        let c = fx.product("c", 3).await;
        for id in [a, b, c] {
            fx.cart().add_to_cart(fx.user_id, id).await.unwrap();
        }

        fx.cart().remove_from_cart(fx.user_id, b).await.unwrap();

        let ids: Vec<_> = fx
            .cart()
            .get_cart(fx.user_id)
            .await
            .unwrap()
            .iter()
            .map(|line| line.product_id)
            .collect();
        assert_eq!(ids, [a, c]);
    }

    #[tokio::test]
    async fn test_remove_absent_item() {
        let fx = Fixture::new().await;
        let a = fx.product("a", 1).await;
        fx.cart().add_to_cart(fx.user_id, a).await.unwrap();

        let result = fx.cart().remove_from_cart(fx.user_id, ProductId::generate()).await;
        assert!(matches!(result, Err(CartError::ItemNotFound)));
        assert_eq!(fx.cart().get_cart(fx.user_id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_checkout_totals_and_clears_cart() {
        let fx = Fixture::new().await;
        let p1 = fx.product("p1", 500).await;
        let p2 = fx.product("p2", 300).await;
        fx.cart().add_to_cart(fx.user_id, p1).await.unwrap();
        fx.cart().add_to_cart(fx.user_id, p2).await.unwrap();

        let receipt = fx.cart().checkout(fx.user_id, None).await.unwrap();
        assert_eq!(receipt.total_price.amount(), 800);

        let user = fx.stored_user().await;
        assert!(user.user_cart.is_empty());
        assert_eq!(user.order_status.len(), 1);
        let order = &user.order_status[0];
        assert_eq!(order.order_id, receipt.order_id);
        assert_eq!(order.payment_method, PaymentMethod::CashOnDelivery);
        assert_eq!(order.discount, Price::ZERO);
        assert_eq!(order.order_list.len(), 2);
    }

    #[tokio::test]
    async fn test_checkout_records_digital_payment() {
        let fx = Fixture::new().await;
        let p1 = fx.product("p1", 500).await;
        fx.cart().add_to_cart(fx.user_id, p1).await.unwrap();

        fx.cart()
            .checkout(fx.user_id, Some(PaymentMethod::Digital))
            .await
            .unwrap();
        let user = fx.stored_user().await;
        assert_eq!(user.order_status[0].payment_method, PaymentMethod::Digital);
    }

    #[tokio::test]
    async fn test_empty_checkout_without_history() {
        let fx = Fixture::new().await;
        let result = fx.cart().checkout(fx.user_id, None).await;
        assert!(matches!(result, Err(CartError::EmptyCart)));
    }

    #[tokio::test]
    async fn test_resubmitted_checkout_returns_previous_order() {
        let fx = Fixture::new().await;
        let p1 = fx.product("p1", 500).await;
        fx.cart().add_to_cart(fx.user_id, p1).await.unwrap();
        let first = fx.cart().checkout(fx.user_id, None).await.unwrap();

        let ordered_on = fx.stored_user().await.order_status[0].ordered_on;

        let soon = fx
            .cart()
            .checkout_at(fx.user_id, None, ordered_on + Duration::seconds(9))
            .await
            .unwrap();
        assert_eq!(soon, first);
        assert_eq!(fx.stored_user().await.order_status.len(), 1);

        let late = fx
            .cart()
            .checkout_at(fx.user_id, None, ordered_on + Duration::seconds(10))
            .await;
        assert!(matches!(late, Err(CartError::EmptyCart)));
    }

    #[tokio::test]
    async fn test_checkout_rejects_sold_product_without_mutation() {
        let fx = Fixture::new().await;
        let lamp = fx.product("lamp", 900).await;
        let other = insert_user(&fx.store, "rival@example.com", "5550002").await;

        fx.cart().add_to_cart(fx.user_id, lamp).await.unwrap();
        fx.cart().instant_buy(other, lamp, None).await.unwrap();

        let result = fx.cart().checkout(fx.user_id, None).await;
        assert!(matches!(result, Err(CartError::AlreadySold)));

        let user = fx.stored_user().await;
        assert_eq!(user.user_cart.len(), 1);
        assert!(user.order_status.is_empty());
    }

    #[tokio::test]
    async fn test_checkout_overflow() {
        let fx = Fixture::new().await;
        let big = fx.product("big", i64::MAX).await;
        let one = fx.product("one", 1).await;
        fx.cart().add_to_cart(fx.user_id, big).await.unwrap();
        fx.cart().add_to_cart(fx.user_id, one).await.unwrap();

        let result = fx.cart().checkout(fx.user_id, None).await;
        assert!(matches!(result, Err(CartError::TotalOverflow)));
        assert_eq!(fx.stored_user().await.user_cart.len(), 2);
    }

    #[tokio::test]
    async fn test_instant_buy_leaves_cart_alone() {
        let fx = Fixture::new().await;
        let in_cart = fx.product("in-cart", 100).await;
        let direct = fx.product("direct", 700).await;
        fx.cart().add_to_cart(fx.user_id, in_cart).await.unwrap();

        let receipt = fx
            .cart()
            .instant_buy(fx.user_id, direct, Some(PaymentMethod::Digital))
            .await
            .unwrap();
        assert_eq!(receipt.total_price.amount(), 700);

        let user = fx.stored_user().await;
        assert_eq!(user.user_cart.len(), 1);
        assert_eq!(user.order_status.len(), 1);
        assert_eq!(user.order_status[0].order_list[0].product_id, direct);

        let again = fx.cart().instant_buy(fx.user_id, direct, None).await;
        assert!(matches!(again, Err(CartError::AlreadySold)));
    }

    #[tokio::test]
    async fn test_unapplied_update_is_persist_error() {
        let inner = MemoryStore::new();
        let user_id = insert_user(&inner, "stale@example.com", "5550003").await;
        let mut ids = Vec::new();
        for name in ["vase", "bowl"] {
            let product = Product {
                product_id: ProductId::generate(),
                product_name: name.into(),
                price: Price::new(40).unwrap(),
                rating: 1,
                image: String::new(),
            };
            inner.insert_product(&product).await.unwrap();
            ids.push(product.product_id);
        }
        let (vase, bowl) = (ids[0], ids[1]);
        CartService::new(&inner).add_to_cart(user_id, vase).await.unwrap();
        let store = StaleStore(inner);
        let cart = CartService::new(&store);

        let result = cart.add_to_cart(user_id, bowl).await;
        assert!(matches!(result, Err(CartError::PersistError)));

        let result = cart.instant_buy(user_id, bowl, None).await;
        assert!(matches!(result, Err(CartError::PersistError)));

        let result = cart.checkout(user_id, None).await;
        assert!(matches!(result, Err(CartError::PersistError)));

        let user = store.find_user(UserKey::Id(user_id)).await.unwrap().unwrap();
        assert_eq!(user.user_cart.len(), 1);
        assert_eq!(user.user_cart[0].product_id, vase);
        assert!(user.order_status.is_empty());
    }
}
