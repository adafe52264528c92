//! Storage primitives the engine requires from its host.
//!
//! The engine never opens a database of its own; it issues reads and
//! updates through this trait. A single call is the unit of atomicity;
//! no transaction or session object is assumed.

mod mem;

pub use mem::MemStore;

use crate::error::Error;
use shroud_proto::{FieldValue, Predicate, Row};

/// The storage interface consumed by the engine.
pub trait Store {
    /// Query rows of a physical storage name matching a predicate,
    /// projecting the given fields (empty = all fields).
    fn query(
        &self,
        storage: &str,
        predicate: Option<&Predicate>,
        fields: &[String],
    ) -> Result<Vec<Row>, Error>;

    /// Update all rows matching a predicate with the given field values,
    /// returning the number of rows affected.
    fn update(
        &self,
        storage: &str,
        matching: &Predicate,
        values: &[FieldValue],
    ) -> Result<u64, Error>;
}

impl<T: Store + ?Sized> Store for &T {
    fn query(
        &self,
        storage: &str,
        predicate: Option<&Predicate>,
        fields: &[String],
    ) -> Result<Vec<Row>, Error> {
        (**self).query(storage, predicate, fields)
    }

    fn update(
        &self,
        storage: &str,
        matching: &Predicate,
        values: &[FieldValue],
    ) -> Result<u64, Error> {
        (**self).update(storage, matching, values)
    }
}

impl<T: Store + ?Sized> Store for std::sync::Arc<T> {
    fn query(
        &self,
        storage: &str,
        predicate: Option<&Predicate>,
        fields: &[String],
    ) -> Result<Vec<Row>, Error> {
        (**self).query(storage, predicate, fields)
    }

    fn update(
        &self,
        storage: &str,
        matching: &Predicate,
        values: &[FieldValue],
    ) -> Result<u64, Error> {
        (**self).update(storage, matching, values)
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;

    /// Store wrapper whose reads fail for one storage name, for exercising
    /// degradation paths that a healthy store never reaches.
    pub(crate) struct FailingReads {
        pub(crate) inner: MemStore,
        failing: &'static str,
    }

    impl FailingReads {
        pub(crate) fn new(failing: &'static str) -> Self {
            Self {
                inner: MemStore::new(),
                failing,
            }
        }
    }

    impl Store for FailingReads {
        fn query(
            &self,
            storage: &str,
            predicate: Option<&Predicate>,
            fields: &[String],
        ) -> Result<Vec<Row>, Error> {
            if storage == self.failing {
                return Err(Error::Storage("backend offline".to_string()));
            }
            self.inner.query(storage, predicate, fields)
        }

        fn update(
            &self,
            storage: &str,
            matching: &Predicate,
            values: &[FieldValue],
        ) -> Result<u64, Error> {
            self.inner.update(storage, matching, values)
        }
    }
}
