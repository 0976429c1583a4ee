//! Live query handle returned by `SqLab::query`.
//!
//! A `Query` only accumulates options; nothing touches the database until a
//! terminal method (`all`, `first`, `count`, `exists`, `columns`, `update`,
//! `delete`) runs. Terminal methods can be called repeatedly.

use crate::model::entity::Entity;
use crate::model::record::Record;
use crate::query::assign::Assignments;
use crate::query::filter::Filter;
use crate::query::order::Order;
use crate::query::select::SelectOptions;
use crate::service::lab::{LabResult, SqLab};
use std::marker::PhantomData;

pub struct Query<'lab, E: Entity> {
    lab: &'lab SqLab,
    options: SelectOptions,
    _entity: PhantomData<fn() -> E>,
}

impl<'lab, E: Entity> Query<'lab, E> {
    pub(crate) fn new(lab: &'lab SqLab) -> Self {
        Self {
            lab,
            options: SelectOptions::default(),
            _entity: PhantomData,
        }
    }

    /// Adds a predicate, AND-ed with earlier ones.
    pub fn filter(mut self, filter: Filter) -> Self {
        self.options = self.options.filter(filter);
        self
    }

    pub fn order_by(mut self, key: Order) -> Self {
        self.options = self.options.order_by(key);
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.options = self.options.limit(limit);
        self
    }

    pub fn offset(mut self, offset: u32) -> Self {
        self.options = self.options.offset(offset);
        self
    }

    pub fn options(&self) -> &SelectOptions {
        &self.options
    }

    pub fn all(&self) -> LabResult<Vec<E>> {
        self.lab.select::<E>(&self.options)
    }

    pub fn first(&self) -> LabResult<Option<E>> {
        let cap = self.options.limit.map_or(1, |limit| limit.min(1));
        let options = self.options.clone().limit(cap);
        Ok(self.lab.select::<E>(&options)?.into_iter().next())
    }

    /// Number of rows `all` would return, limit and offset included.
    pub fn count(&self) -> LabResult<u64> {
        self.lab.count_window::<E>(&self.options)
    }

    pub fn exists(&self) -> LabResult<bool> {
        Ok(self.first()?.is_some())
    }

    pub fn columns(&self, columns: &[&str]) -> LabResult<Vec<Record>> {
        self.lab.select_columns::<E>(columns, &self.options)
    }

    /// Updates every row matching the accumulated filter.
    ///
    /// Ordering, limit and offset do not narrow the update.
    pub fn update(&self, assignments: &Assignments) -> LabResult<usize> {
        self.lab.update::<E>(assignments, self.options.filter.as_ref())
    }

    /// Deletes every row matching the accumulated filter.
    ///
    /// Ordering, limit and offset do not narrow the delete. Without any
    /// filter the whole table is emptied.
    pub fn delete(&self) -> LabResult<usize> {
        self.lab.delete::<E>(self.options.filter.as_ref())
    }
}
