//! Stage-level and whole-query edits.

use crate::model::{PipeSegment, QueryFieldDef, TurtleDef};
use crate::summary::StagePath;

use super::{pipeline_mut, stage_mut, validate_name, ModifyError, ModifyResult, QueryBuilder};

impl QueryBuilder {
    /// Append an empty stage to a pipeline.
    ///
    /// * no `parent`: the top-level pipeline
    /// * `parent` and `field_index`: the nested query at that field of `parent`
    /// * `parent` alone: the pipeline that contains `parent`
    pub fn add_stage(
        &self,
        parent: Option<&StagePath>,
        field_index: Option<usize>,
    ) -> ModifyResult<Self> {
        self.edit("add_stage", |query| {
            let pipeline = match (parent, field_index) {
                (None, _) => &mut query.pipeline,
                (Some(path), None) => {
                    let pipeline = pipeline_mut(query, path)?;
                    if path.stage_index >= pipeline.len() {
                        return Err(ModifyError::StageNotFound {
                            stage_index: path.stage_index,
                        });
                    }
                    pipeline
                }
                (Some(path), Some(field_index)) => {
                    let field = stage_mut(query, path)?
                        .fields
                        .get_mut(field_index)
                        .ok_or(ModifyError::FieldNotFound { field_index })?;
                    match &mut field.def {
                        QueryFieldDef::Nest(turtle) => &mut turtle.pipeline,
                        _ => return Err(ModifyError::NotANestedQuery { field_index }),
                    }
                }
            };
            pipeline.push(PipeSegment::default());
            Ok(())
        })
    }

    /// Remove a stage. The last stage of a pipeline is emptied instead, so
    /// every pipeline keeps at least one stage.
    pub fn remove_stage(&self, path: &StagePath) -> ModifyResult<Self> {
        self.edit("remove_stage", |query| {
            let pipeline = pipeline_mut(query, path)?;
            if path.stage_index >= pipeline.len() {
                return Err(ModifyError::StageNotFound {
                    stage_index: path.stage_index,
                });
            }
            if pipeline.len() == 1 {
                pipeline[0] = PipeSegment::default();
            } else {
                pipeline.remove(path.stage_index);
            }
            Ok(())
        })
    }

    /// Start over with an empty query.
    pub fn clear_query(&self) -> Self {
        Self::new(self.source.clone())
    }

    /// Load the saved view `name` of the source for editing.
    pub fn load_query(&self, name: &str) -> ModifyResult<Self> {
        let turtle = self
            .source
            .turtles()
            .find(|t| t.name == name)
            .cloned()
            .ok_or_else(|| ModifyError::QueryNotFound(name.to_string()))?;
        Ok(self.replace_query(turtle))
    }

    /// Swap in a whole query.
    ///
    /// Definitions and nests carry their output name themselves, so a
    /// `rename` on one is folded into that name.
    pub fn replace_query(&self, mut query: TurtleDef) -> Self {
        if query.pipeline.is_empty() {
            query.pipeline.push(PipeSegment::default());
        }
        fold_renames(&mut query.pipeline);
        Self::with_query(self.source.clone(), query)
    }

    pub fn rename_query(&self, name: &str) -> ModifyResult<Self> {
        validate_name(name)?;
        self.edit("rename_query", |query| {
            query.name = name.to_string();
            Ok(())
        })
    }
}

fn fold_renames(pipeline: &mut [PipeSegment]) {
    for field in pipeline.iter_mut().flat_map(|stage| stage.fields.iter_mut()) {
        match &mut field.def {
            QueryFieldDef::Reference { .. } => {}
            QueryFieldDef::Definition(def) => {
                if let Some(name) = field.rename.take() {
                    def.name = name;
                }
            }
            QueryFieldDef::Nest(turtle) => {
                if let Some(name) = field.rename.take() {
                    turtle.name = name;
                }
                fold_renames(&mut turtle.pipeline);
            }
        }
    }
}
