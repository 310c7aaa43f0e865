//! Address book engine.
//!
//! Addresses are kept in insertion order. The first entry is the home
//! address and the second is the work address.

use thiserror::Error;

use emporium_core::{AddressId, UserId};

use crate::db::{Store, StoreError, UserKey, UserUpdate};
use crate::models::{Address, AddressInput, User};

const HOME: usize = 0;
const WORK: usize = 1;

/// Errors from address book operations.
#[derive(Debug, Error)]
pub enum AddressError {
    #[error("user not found")]
    UserNotFound,

    #[error("no addresses found")]
    NoAddresses,

    #[error("address not found")]
    AddressNotFound,

    /// A supplied id is already used by another address of the user.
    #[error("address id already exists")]
    DuplicateAddress,

    /// A required field is blank.
    #[error("{0} is required")]
    MissingField(&'static str),

    /// The store accepted the call but changed nothing.
    #[error("update was not applied")]
    PersistError,

    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

/// Address book engine.
pub struct AddressService<'a> {
    store: &'a dyn Store,
}

impl<'a> AddressService<'a> {
    #[must_use]
    pub const fn new(store: &'a dyn Store) -> Self {
        Self { store }
    }

    /// All of the user's addresses, home first.
    ///
    /// # Errors
    ///
    /// `UserNotFound`.
    pub async fn list(&self, user_id: UserId) -> Result<Vec<Address>, AddressError> {
        Ok(self.user(user_id).await?.address_details)
    }

    /// Append an address.
    ///
    /// # Errors
    ///
    /// `UserNotFound`, `MissingField`, `DuplicateAddress`, `PersistError`.
    pub async fn add(&self, user_id: UserId, input: AddressInput) -> Result<AddressId, AddressError> {
        let user = self.user(user_id).await?;
        validate(&input)?;

        let address_id = input.address_id.unwrap_or_else(AddressId::generate);
        let mut addresses = user.address_details;
        ensure_unused(&addresses, address_id, None)?;
        addresses.push(input.into_address(address_id));
        self.persist(user_id, addresses).await?;

        Ok(address_id)
    }

    /// Overwrite the home address.
    ///
    /// # Errors
    ///
    /// `UserNotFound`, `NoAddresses`, `MissingField`, `DuplicateAddress`,
    /// `PersistError`.
    pub async fn edit_home(
        &self,
        user_id: UserId,
        input: AddressInput,
    ) -> Result<AddressId, AddressError> {
        let user = self.user(user_id).await?;
        validate(&input)?;

        let mut addresses = user.address_details;
        let Some(current) = addresses.get(HOME).map(|home| home.address_id) else {
            return Err(AddressError::NoAddresses);
        };
        let address_id = input.address_id.unwrap_or(current);
        ensure_unused(&addresses, address_id, Some(HOME))?;
        if let Some(home) = addresses.get_mut(HOME) {
            *home = input.into_address(address_id);
        }
        self.persist(user_id, addresses).await?;

        Ok(address_id)
    }

    /// Overwrite the work address, or add it if there is none yet.
    ///
    /// # Errors
    ///
    /// `UserNotFound`, `MissingField`, `DuplicateAddress`, `PersistError`.
    pub async fn edit_work(
        &self,
        user_id: UserId,
        input: AddressInput,
    ) -> Result<AddressId, AddressError> {
        let user = self.user(user_id).await?;
        validate(&input)?;

        let mut addresses = user.address_details;
        let address_id = if let Some(current) = addresses.get(WORK).map(|work| work.address_id) {
            let address_id = input.address_id.unwrap_or(current);
            ensure_unused(&addresses, address_id, Some(WORK))?;
            if let Some(work) = addresses.get_mut(WORK) {
                *work = input.into_address(address_id);
            }
            address_id
        } else {
            let address_id = input.address_id.unwrap_or_else(AddressId::generate);
            ensure_unused(&addresses, address_id, None)?;
            addresses.push(input.into_address(address_id));
            address_id
        };
        self.persist(user_id, addresses).await?;

        Ok(address_id)
    }

    /// Remove one address; the rest keep their relative order.
    ///
    /// # Errors
    ///
    /// `UserNotFound`, `AddressNotFound`, `PersistError`.
    pub async fn delete(&self, user_id: UserId, address_id: AddressId) -> Result<(), AddressError> {
        let user = self.user(user_id).await?;

        let mut addresses = user.address_details;
        let position = addresses
            .iter()
            .position(|a| a.address_id == address_id)
            .ok_or(AddressError::AddressNotFound)?;
        addresses.remove(position);
        self.persist(user_id, addresses).await
    }

    async fn user(&self, user_id: UserId) -> Result<User, AddressError> {
        self.store
            .find_user(UserKey::Id(user_id))
            .await?
            .ok_or(AddressError::UserNotFound)
    }

    async fn persist(&self, user_id: UserId, addresses: Vec<Address>) -> Result<(), AddressError> {
        let outcome = self
            .store
            .update_user(user_id, UserUpdate::default().addresses(addresses))
            .await?;
        if !outcome.applied() {
            return Err(AddressError::PersistError);
        }
        Ok(())
    }
}

/// Fail if `address_id` belongs to an entry other than the one at `slot`.
fn ensure_unused(
    addresses: &[Address],
    address_id: AddressId,
    slot: Option<usize>,
) -> Result<(), AddressError> {
    let taken = addresses
        .iter()
        .enumerate()
        .any(|(i, a)| a.address_id == address_id && Some(i) != slot);
    if taken {
        return Err(AddressError::DuplicateAddress);
    }
    Ok(())
}

fn validate(input: &AddressInput) -> Result<(), AddressError> {
    match input.blank_field() {
        Some(field) => Err(AddressError::MissingField(field)),
        None => Ok(()),
    }
}
