//! Edits to the output fields of a stage.

use crate::model::{
    kind_of_field, AtomicField, FieldDef, FieldKind, PipeSegment, QueryField, QueryFieldDef,
    TurtleDef,
};
use crate::summary::StagePath;

use super::{
    ensure_unique_name, stage_mut, stage_ref, validate_name, ModifyError, ModifyResult,
    QueryBuilder,
};

impl QueryBuilder {
    /// Add the saved field at `field_path` to the stage, or remove it if the
    /// stage already outputs it.
    pub fn toggle_field(&self, path: &StagePath, field_path: &str) -> ModifyResult<Self> {
        let stage = stage_ref(&self.query, path)?;
        match stage
            .fields
            .iter()
            .position(|field| field.reference_path() == Some(field_path))
        {
            Some(field_index) => self.remove_field(path, field_index),
            None => self.add_field(path, field_path),
        }
    }

    /// Append a reference to the saved field at `field_path`.
    pub fn add_field(&self, path: &StagePath, field_path: &str) -> ModifyResult<Self> {
        let input = self.stage_input(path)?;
        let def = input
            .resolve(field_path)
            .ok_or_else(|| ModifyError::UnknownField(field_path.to_string()))?;
        if let FieldDef::Struct(_) = def {
            return Err(ModifyError::WrongFieldKind {
                name: field_path.to_string(),
                expected: FieldKind::Dimension,
                actual: FieldKind::Source,
            });
        }
        let field = QueryField::reference(field_path);
        self.edit("add_field", |query| {
            let stage = stage_mut(query, path)?;
            ensure_unique_name(stage, field.output_name(), None)?;
            stage.fields.push(field);
            Ok(())
        })
    }

    pub fn add_new_dimension(&self, path: &StagePath, def: AtomicField) -> ModifyResult<Self> {
        self.add_new_definition(path, def, FieldKind::Dimension)
    }

    pub fn add_new_measure(&self, path: &StagePath, def: AtomicField) -> ModifyResult<Self> {
        self.add_new_definition(path, def, FieldKind::Measure)
    }

    fn add_new_definition(
        &self,
        path: &StagePath,
        def: AtomicField,
        expected: FieldKind,
    ) -> ModifyResult<Self> {
        validate_name(&def.name)?;
        let actual = kind_of_field(&FieldDef::Atomic(def.clone()));
        if actual != expected {
            return Err(ModifyError::WrongFieldKind {
                name: def.name,
                expected,
                actual,
            });
        }
        self.edit("add_new_definition", |query| {
            let stage = stage_mut(query, path)?;
            ensure_unique_name(stage, &def.name, None)?;
            stage.fields.push(QueryField::definition(def));
            Ok(())
        })
    }

    /// Append an empty nested query called `name`.
    pub fn add_new_nested_query(&self, path: &StagePath, name: &str) -> ModifyResult<Self> {
        validate_name(name)?;
        self.edit("add_new_nested_query", |query| {
            let stage = stage_mut(query, path)?;
            ensure_unique_name(stage, name, None)?;
            stage.fields.push(QueryField::nest(TurtleDef::empty(name)));
            Ok(())
        })
    }

    /// Replace an inline definition, keeping its filters and renderer.
    pub fn edit_field_definition(
        &self,
        path: &StagePath,
        field_index: usize,
        def: AtomicField,
    ) -> ModifyResult<Self> {
        validate_name(&def.name)?;
        self.edit("edit_field_definition", |query| {
            let stage = stage_mut(query, path)?;
            let field = field_at(stage, field_index)?;
            let QueryFieldDef::Definition(_) = field.def else {
                return Err(ModifyError::NotADefinition(field_index));
            };
            let old_name = field.output_name().to_string();
            ensure_unique_name(stage, &def.name, Some(field_index))?;
            let new_name = def.name.clone();
            stage.fields[field_index].def = QueryFieldDef::Definition(def);
            follow_rename(stage, &old_name, &new_name);
            Ok(())
        })
    }

    /// Remove a field along with its filters and any ordering on it.
    pub fn remove_field(&self, path: &StagePath, field_index: usize) -> ModifyResult<Self> {
        self.edit("remove_field", |query| {
            let stage = stage_mut(query, path)?;
            field_at(stage, field_index)?;
            let removed = stage.fields.remove(field_index);
            let name = removed.output_name();
            stage.order_by.retain(|order_by| order_by.field != name);
            Ok(())
        })
    }

    /// Give a field a new output name. Orderings on the old name follow it.
    pub fn rename_field(
        &self,
        path: &StagePath,
        field_index: usize,
        name: &str,
    ) -> ModifyResult<Self> {
        validate_name(name)?;
        self.edit("rename_field", |query| {
            let stage = stage_mut(query, path)?;
            rename_in_stage(stage, field_index, name)
        })
    }

    /// Turn a reference to a saved field into an equivalent inline definition.
    pub fn replace_with_definition(
        &self,
        path: &StagePath,
        field_index: usize,
    ) -> ModifyResult<Self> {
        let input = self.stage_input(path)?;
        let stage = stage_ref(&self.query, path)?;
        let field = field_at(stage, field_index)?;
        let field_path = field
            .reference_path()
            .ok_or(ModifyError::NotAReference(field_index))?;
        let name = field.output_name().to_string();

        let def = match input.resolve(field_path) {
            None => return Err(ModifyError::UnknownField(field_path.to_string())),
            Some(FieldDef::Atomic(saved)) => {
                // Saved expressions are relative to the struct that declares
                // them, so joined fields are defined through their path.
                let expression = match &saved.expression {
                    Some(expression) if !field_path.contains('.') => expression.clone(),
                    _ => field_path.to_string(),
                };
                QueryFieldDef::Definition(AtomicField {
                    name,
                    data_type: saved.data_type,
                    expression: Some(expression),
                    aggregate: saved.aggregate,
                })
            }
            Some(FieldDef::Turtle(saved)) => QueryFieldDef::Nest(TurtleDef {
                name,
                pipeline: saved.pipeline.clone(),
            }),
            Some(FieldDef::Struct(_)) => {
                return Err(ModifyError::CannotDefine(field_path.to_string()))
            }
        };

        self.edit("replace_with_definition", |query| {
            let field = &mut stage_mut(query, path)?.fields[field_index];
            field.def = def;
            field.rename = None;
            Ok(())
        })
    }

    /// Reorder the fields of a stage. `order[i]` is the current index of the
    /// field that moves to position `i`.
    pub fn update_field_order(&self, path: &StagePath, order: &[usize]) -> ModifyResult<Self> {
        self.edit("update_field_order", |query| {
            let stage = stage_mut(query, path)?;
            let mut sorted = order.to_vec();
            sorted.sort_unstable();
            let is_permutation = sorted.len() == stage.fields.len()
                && sorted.iter().enumerate().all(|(i, &index)| i == index);
            if !is_permutation {
                return Err(ModifyError::NotAPermutation {
                    expected: stage.fields.len(),
                    got: order.to_vec(),
                });
            }
            stage.fields = order.iter().map(|&i| stage.fields[i].clone()).collect();
            Ok(())
        })
    }

    /// Attach a renderer hint to a field, or clear it with `None`.
    pub fn set_renderer(
        &self,
        path: &StagePath,
        field_index: usize,
        renderer: Option<&str>,
    ) -> ModifyResult<Self> {
        self.edit("set_renderer", |query| {
            let stage = stage_mut(query, path)?;
            field_at(stage, field_index)?;
            stage.fields[field_index].renderer = renderer.map(str::to_string);
            Ok(())
        })
    }
}

pub(super) fn field_at(stage: &PipeSegment, field_index: usize) -> ModifyResult<&QueryField> {
    stage
        .fields
        .get(field_index)
        .ok_or(ModifyError::FieldNotFound { field_index })
}

/// Rename the field at `field_index`, keeping orderings attached to it.
pub(super) fn rename_in_stage(
    stage: &mut PipeSegment,
    field_index: usize,
    name: &str,
) -> ModifyResult<()> {
    let old_name = field_at(stage, field_index)?.output_name().to_string();
    ensure_unique_name(stage, name, Some(field_index))?;

    let field = &mut stage.fields[field_index];
    match &mut field.def {
        QueryFieldDef::Reference { path } => {
            let base = path.rsplit('.').next().unwrap_or(path.as_str());
            field.rename = (base != name).then(|| name.to_string());
        }
        QueryFieldDef::Definition(def) => {
            def.name = name.to_string();
            field.rename = None;
        }
        QueryFieldDef::Nest(turtle) => {
            turtle.name = name.to_string();
            field.rename = None;
        }
    }

    follow_rename(stage, &old_name, name);
    Ok(())
}

fn follow_rename(stage: &mut PipeSegment, old_name: &str, new_name: &str) {
    for order_by in stage.order_by.iter_mut().filter(|o| o.field == old_name) {
        order_by.field = new_name.to_string();
    }
}
