//! Schema-driven planning, validation and semantic equality
//!
//! These functions implement the parts of PlanResourceChange,
//! Validate*Config and the read/apply paths that depend only on the schema,
//! so resources only deal with their own logic.

use crate::plan_modifier::values_equal;
use crate::schema::{
    Attribute, DefaultRequest, ObjectNestingMode, PlanModifierRequest, Schema, ValidatorRequest,
};
use crate::types::{AttributePath, AttributePathStep, Diagnostic, Dynamic};

/// Result of planning a resource change
#[derive(Debug)]
pub struct PlanOutput {
    pub planned_state: Dynamic,
    pub requires_replace: Vec<AttributePath>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Turn Terraform's proposed new state into the provider's planned state.
///
/// Steps: defaults where configuration is null, unknown marking of computed
/// attributes when anything changed, then attribute plan modifiers.
pub fn plan_resource_change(
    schema: &Schema,
    prior: &Dynamic,
    proposed: Dynamic,
    config: &Dynamic,
) -> PlanOutput {
    if proposed.is_null() {
        return PlanOutput {
            planned_state: Dynamic::Null,
            requires_replace: vec![],
            diagnostics: vec![],
        };
    }

    let attributes = &schema.block.attributes;
    let root = AttributePath::root();
    let creating = prior.is_null();

    let mut plan = proposed;
    apply_defaults(attributes, &mut plan, config, &root);
    let mut plan = schema.conform(plan);

    if creating || !values_equal(&plan, prior) {
        mark_computed_unknown(attributes, &mut plan, config);
    }

    let mut output = PlanOutput {
        planned_state: Dynamic::Null,
        requires_replace: vec![],
        diagnostics: vec![],
    };
    run_plan_modifiers(
        attributes,
        &mut plan,
        prior,
        config,
        &root,
        creating,
        &mut output,
    );
    output.planned_state = plan;
    output
}

/// Required attribute checks and attribute validators
pub fn validate_config(schema: &Schema, config: &Dynamic) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();
    if config.as_map().is_some() {
        validate_attributes(
            &schema.block.attributes,
            config,
            &AttributePath::root(),
            &mut diagnostics,
        );
    }
    diagnostics
}

/// Keep `prior` values where the new value means the same thing
pub fn apply_semantic_equality(schema: &Schema, prior: &Dynamic, new: Dynamic) -> Dynamic {
    let mut new = new;
    keep_equal_values(&schema.block.attributes, prior, &mut new);
    new
}

fn apply_defaults(attributes: &[Attribute], plan: &mut Dynamic, config: &Dynamic, path: &AttributePath) {
    for attr in attributes {
        let config_value = config.attr(&attr.name);
        let attr_path = path.clone().attribute(&attr.name);

        if let Some(default) = &attr.default {
            if config_value.is_null() {
                let response = default.default_value(DefaultRequest {
                    path: attr_path.clone(),
                });
                set_attr(plan, &attr.name, response.value);
            }
        }

        let Some(nested) = &attr.nested_type else {
            continue;
        };
        let Some(child) = attr_mut(plan, &attr.name) else {
            continue;
        };
        for (step, element) in nested_children_mut(nested.nesting, child) {
            let element_config = child_of(config_value, &step);
            let element_path = extend(&attr_path, &step);
            apply_defaults(&nested.attributes, element, element_config, &element_path);
        }
    }
}

fn mark_computed_unknown(attributes: &[Attribute], plan: &mut Dynamic, config: &Dynamic) {
    for attr in attributes {
        let config_value = config.attr(&attr.name);

        if attr.computed && config_value.is_null() && attr.default.is_none() {
            set_attr(plan, &attr.name, Dynamic::Unknown);
            continue;
        }

        let Some(nested) = &attr.nested_type else {
            continue;
        };
        let Some(child) = attr_mut(plan, &attr.name) else {
            continue;
        };
        for (step, element) in nested_children_mut(nested.nesting, child) {
            mark_computed_unknown(&nested.attributes, element, child_of(config_value, &step));
        }
    }
}

fn run_plan_modifiers(
    attributes: &[Attribute],
    plan: &mut Dynamic,
    prior: &Dynamic,
    config: &Dynamic,
    path: &AttributePath,
    creating: bool,
    output: &mut PlanOutput,
) {
    for attr in attributes {
        let attr_path = path.clone().attribute(&attr.name);
        let state_value = prior.attr(&attr.name);
        let config_value = config.attr(&attr.name);

        for modifier in &attr.plan_modifiers {
            let response = modifier.modify(PlanModifierRequest {
                config_value: config_value.clone(),
                state_value: state_value.clone(),
                plan_value: plan.attr(&attr.name).clone(),
                path: attr_path.clone(),
                creating,
            });
            set_attr(plan, &attr.name, response.plan_value);
            output.diagnostics.extend(response.diagnostics);
            if response.requires_replace {
                output.requires_replace.push(attr_path.clone());
            }
        }

        let Some(nested) = &attr.nested_type else {
            continue;
        };
        let Some(child) = attr_mut(plan, &attr.name) else {
            continue;
        };
        for (step, element) in nested_children_mut(nested.nesting, child) {
            run_plan_modifiers(
                &nested.attributes,
                element,
                child_of(state_value, &step),
                child_of(config_value, &step),
                &extend(&attr_path, &step),
                creating,
                output,
            );
        }
    }
}

fn validate_attributes(
    attributes: &[Attribute],
    config: &Dynamic,
    path: &AttributePath,
    diagnostics: &mut Vec<Diagnostic>,
) {
    for attr in attributes {
        let value = config.attr(&attr.name);
        let attr_path = path.clone().attribute(&attr.name);

        if value.is_null() {
            if attr.required {
                diagnostics.push(
                    Diagnostic::error(
                        "Missing required argument",
                        format!(
                            "The argument \"{}\" is required, but no definition was found.",
                            attr.name
                        ),
                    )
                    .with_attribute(attr_path),
                );
            }
            continue;
        }
        if value.is_unknown() {
            continue;
        }

        for validator in &attr.validators {
            let response = validator.validate(ValidatorRequest {
                config_value: value.clone(),
                path: attr_path.clone(),
            });
            diagnostics.extend(response.diagnostics);
        }

        if let Some(nested) = &attr.nested_type {
            for (step, element) in nested_children(nested.nesting, value) {
                validate_attributes(
                    &nested.attributes,
                    element,
                    &extend(&attr_path, &step),
                    diagnostics,
                );
            }
        }
    }
}

fn keep_equal_values(attributes: &[Attribute], prior: &Dynamic, new: &mut Dynamic) {
    for attr in attributes {
        let prior_value = prior.attr(&attr.name);
        if prior_value.is_null() || prior_value.is_unknown() {
            continue;
        }

        if let Some(equality) = &attr.semantic_equality {
            let new_value = new.attr(&attr.name);
            if !new_value.is_null()
                && !new_value.is_unknown()
                && prior_value != new_value
                && equality.semantically_equal(prior_value, new_value)
            {
                set_attr(new, &attr.name, prior_value.clone());
            }
            continue;
        }

        let Some(nested) = &attr.nested_type else {
            continue;
        };
        let Some(child) = attr_mut(new, &attr.name) else {
            continue;
        };
        for (step, element) in nested_children_mut(nested.nesting, child) {
            keep_equal_values(&nested.attributes, child_of(prior_value, &step), element);
        }
    }
}

fn attr_mut<'a>(value: &'a mut Dynamic, name: &str) -> Option<&'a mut Dynamic> {
    match value {
        Dynamic::Map(map) => map.get_mut(name),
        _ => None,
    }
}

fn set_attr(value: &mut Dynamic, name: &str, new_value: Dynamic) {
    if let Dynamic::Map(map) = value {
        map.insert(name.to_string(), new_value);
    }
}

fn nested_children_mut(
    nesting: ObjectNestingMode,
    value: &mut Dynamic,
) -> Vec<(Option<AttributePathStep>, &mut Dynamic)> {
    match nesting {
        ObjectNestingMode::Single if matches!(value, Dynamic::Map(_)) => vec![(None, value)],
        ObjectNestingMode::Single => vec![],
        ObjectNestingMode::List | ObjectNestingMode::Set => match value {
            Dynamic::List(items) => items
                .iter_mut()
                .enumerate()
                .filter(|(_, item)| matches!(item, Dynamic::Map(_)))
                .map(|(i, item)| (Some(AttributePathStep::ElementKeyInt(i as i64)), item))
                .collect(),
            _ => vec![],
        },
        ObjectNestingMode::Map => match value {
            Dynamic::Map(map) => map
                .iter_mut()
                .filter(|(_, item)| matches!(item, Dynamic::Map(_)))
                .map(|(k, item)| (Some(AttributePathStep::ElementKeyString(k.clone())), item))
                .collect(),
            _ => vec![],
        },
    }
}

fn nested_children(
    nesting: ObjectNestingMode,
    value: &Dynamic,
) -> Vec<(Option<AttributePathStep>, &Dynamic)> {
    match nesting {
        ObjectNestingMode::Single if matches!(value, Dynamic::Map(_)) => vec![(None, value)],
        ObjectNestingMode::Single => vec![],
        ObjectNestingMode::List | ObjectNestingMode::Set => match value {
            Dynamic::List(items) => items
                .iter()
                .enumerate()
                .filter(|(_, item)| matches!(item, Dynamic::Map(_)))
                .map(|(i, item)| (Some(AttributePathStep::ElementKeyInt(i as i64)), item))
                .collect(),
            _ => vec![],
        },
        ObjectNestingMode::Map => match value {
            Dynamic::Map(map) => map
                .iter()
                .filter(|(_, item)| matches!(item, Dynamic::Map(_)))
                .map(|(k, item)| (Some(AttributePathStep::ElementKeyString(k.clone())), item))
                .collect(),
            _ => vec![],
        },
    }
}

fn child_of<'a>(value: &'a Dynamic, step: &Option<AttributePathStep>) -> &'a Dynamic {
    match step {
        None => value,
        Some(AttributePathStep::ElementKeyInt(i)) => value.element(*i as usize),
        Some(AttributePathStep::ElementKeyString(k)) | Some(AttributePathStep::AttributeName(k)) => {
            value.attr(k)
        }
    }
}

fn extend(path: &AttributePath, step: &Option<AttributePathStep>) -> AttributePath {
    let mut path = path.clone();
    if let Some(step) = step {
        path.steps.push(step.clone());
    }
    path
}
