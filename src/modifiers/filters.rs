//! Edits to stage filters and field refinements.

use crate::model::schema::query_field_kind;
use crate::model::{FieldKind, FilterCondition};
use crate::summary::StagePath;

use super::fields::{field_at, rename_in_stage};
use super::{stage_mut, stage_ref, validate_name, ModifyError, ModifyResult, QueryBuilder};

impl QueryBuilder {
    /// Append a filter to the stage.
    pub fn add_filter(&self, path: &StagePath, filter: FilterCondition) -> ModifyResult<Self> {
        self.edit("add_filter", |query| {
            stage_mut(query, path)?.filters.push(filter);
            Ok(())
        })
    }

    /// Refine the measure at `field_index` with `filter`, naming the
    /// filtered field `as_name` when given.
    pub fn add_filter_to_field(
        &self,
        path: &StagePath,
        field_index: usize,
        filter: FilterCondition,
        as_name: Option<&str>,
    ) -> ModifyResult<Self> {
        let input = self.stage_input(path)?;
        let field = field_at(stage_ref(&self.query, path)?, field_index)?;
        match query_field_kind(&input, field) {
            Some(FieldKind::Measure) => {}
            Some(_) => return Err(ModifyError::FilterOnNonMeasure(field.output_name().into())),
            None => {
                let missing = field.reference_path().unwrap_or(field.output_name());
                return Err(ModifyError::UnknownField(missing.into()));
            }
        }
        if let Some(name) = as_name {
            validate_name(name)?;
        }

        self.edit("add_filter_to_field", |query| {
            let stage = stage_mut(query, path)?;
            if let Some(name) = as_name {
                rename_in_stage(stage, field_index, name)?;
            }
            stage.fields[field_index].filters.push(filter);
            Ok(())
        })
    }

    /// Replace a stage filter, or a field refinement when `field_index` is set.
    pub fn edit_filter(
        &self,
        path: &StagePath,
        field_index: Option<usize>,
        filter_index: usize,
        filter: FilterCondition,
    ) -> ModifyResult<Self> {
        self.edit("edit_filter", |query| {
            let stage = stage_mut(query, path)?;
            let filters = match field_index {
                Some(index) => {
                    field_at(stage, index)?;
                    &mut stage.fields[index].filters
                }
                None => &mut stage.filters,
            };
            let slot = filters
                .get_mut(filter_index)
                .ok_or(ModifyError::FilterNotFound(filter_index))?;
            *slot = filter;
            Ok(())
        })
    }

    /// Remove a stage filter, or a field refinement when `field_index` is set.
    pub fn remove_filter(
        &self,
        path: &StagePath,
        field_index: Option<usize>,
        filter_index: usize,
    ) -> ModifyResult<Self> {
        self.edit("remove_filter", |query| {
            let stage = stage_mut(query, path)?;
            let filters = match field_index {
                Some(index) => {
                    field_at(stage, index)?;
                    &mut stage.fields[index].filters
                }
                None => &mut stage.filters,
            };
            if filter_index >= filters.len() {
                return Err(ModifyError::FilterNotFound(filter_index));
            }
            filters.remove(filter_index);
            Ok(())
        })
    }
}
