//! Limits and orderings.

use crate::model::schema::query_field_kind;
use crate::model::{FieldKind, OrderBy, SortDirection};
use crate::summary::StagePath;

use super::{stage_mut, stage_ref, ModifyError, ModifyResult, QueryBuilder};

impl QueryBuilder {
    /// Set the stage's row limit. `n` must be positive.
    pub fn add_limit(&self, path: &StagePath, n: i64) -> ModifyResult<Self> {
        let limit = u64::try_from(n)
            .ok()
            .filter(|&limit| limit > 0)
            .ok_or(ModifyError::InvalidLimit(n))?;
        self.edit("add_limit", |query| {
            stage_mut(query, path)?.limit = Some(limit);
            Ok(())
        })
    }

    pub fn remove_limit(&self, path: &StagePath) -> ModifyResult<Self> {
        self.edit("remove_limit", |query| {
            let stage = stage_mut(query, path)?;
            stage.limit.take().ok_or(ModifyError::NoLimit)?;
            Ok(())
        })
    }

    /// Order the stage by the scalar output `by_field`, replacing any
    /// existing ordering on that field.
    pub fn add_order_by(
        &self,
        path: &StagePath,
        by_field: &str,
        direction: Option<SortDirection>,
    ) -> ModifyResult<Self> {
        let input = self.stage_input(path)?;
        let stage = stage_ref(&self.query, path)?;
        let is_scalar_output = stage
            .field_index_of(by_field)
            .and_then(|index| query_field_kind(&input, &stage.fields[index]))
            .is_some_and(|kind| matches!(kind, FieldKind::Dimension | FieldKind::Measure));
        if !is_scalar_output {
            return Err(ModifyError::UnknownOrderByField(by_field.to_string()));
        }

        self.edit("add_order_by", |query| {
            let stage = stage_mut(query, path)?;
            let order_by = OrderBy {
                field: by_field.to_string(),
                direction,
            };
            match stage.order_by.iter_mut().find(|o| o.field == by_field) {
                Some(existing) => *existing = order_by,
                None => stage.order_by.push(order_by),
            }
            Ok(())
        })
    }

    /// Change the direction of an existing ordering.
    pub fn edit_order_by(
        &self,
        path: &StagePath,
        order_by_index: usize,
        direction: Option<SortDirection>,
    ) -> ModifyResult<Self> {
        self.edit("edit_order_by", |query| {
            let order_by = stage_mut(query, path)?
                .order_by
                .get_mut(order_by_index)
                .ok_or(ModifyError::OrderByNotFound(order_by_index))?;
            order_by.direction = direction;
            Ok(())
        })
    }

    pub fn remove_order_by(&self, path: &StagePath, order_by_index: usize) -> ModifyResult<Self> {
        self.edit("remove_order_by", |query| {
            let stage = stage_mut(query, path)?;
            if order_by_index >= stage.order_by.len() {
                return Err(ModifyError::OrderByNotFound(order_by_index));
            }
            stage.order_by.remove(order_by_index);
            Ok(())
        })
    }
}
