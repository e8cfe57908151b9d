use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::repo::Recipe;
use crate::error::{ApiError, FieldError};

/// Request body for creating or fully replacing a recipe. Fields are
/// optional at the deserialization layer so that missing ones come back
/// as per-field validation errors.
#[derive(Debug, Deserialize)]
pub struct RecipeBody {
    pub title: Option<String>,
    pub description: Option<String>,
    pub ingredients: Option<String>,
    pub instructions: Option<String>,
}

/// Validated recipe data, ready for the store.
#[derive(Debug)]
pub struct NewRecipe {
    pub title: String,
    pub description: Option<String>,
    pub ingredients: String,
    pub instructions: String,
}

impl RecipeBody {
    /// Requires title, ingredients and instructions; description stays
    /// optional. No structural validation of ingredients or instructions:
    /// both are opaque text.
    pub fn validate(self) -> Result<NewRecipe, ApiError> {
        let mut errors = Vec::new();

        if self.title.as_deref().map(str::trim).unwrap_or("").is_empty() {
            errors.push(FieldError::required("title"));
        }
        if self.ingredients.as_deref().unwrap_or("").is_empty() {
            errors.push(FieldError::required("ingredients"));
        }
        if self.instructions.as_deref().unwrap_or("").is_empty() {
            errors.push(FieldError::required("instructions"));
        }

        if !errors.is_empty() {
            return Err(ApiError::Validation(errors));
        }

        Ok(NewRecipe {
            title: self.title.unwrap_or_default(),
            description: self.description,
            ingredients: self.ingredients.unwrap_or_default(),
            instructions: self.instructions.unwrap_or_default(),
        })
    }
}

/// Recipe as returned to clients. The owner is tracked server-side and
/// not part of the representation.
#[derive(Debug, Serialize)]
pub struct RecipeOut {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub ingredients: String,
    pub instructions: String,
}

impl From<Recipe> for RecipeOut {
    fn from(r: Recipe) -> Self {
        Self {
            id: r.id,
            title: r.title,
            description: r.description,
            ingredients: r.ingredients,
            instructions: r.instructions,
        }
    }
}

/// Query parameters accepted by the list endpoint. `page` is kept as raw
/// text so a non-numeric value maps into the error taxonomy instead of a
/// plain-text extractor rejection.
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub search: Option<String>,
    pub page: Option<String>,
}

impl ListQuery {
    /// Page number, defaulting to the first page. Anything that does not
    /// parse as a positive integer is an invalid page.
    pub fn page(&self) -> Result<i64, ApiError> {
        match self.page.as_deref() {
            None => Ok(1),
            Some(raw) => raw.trim().parse::<i64>().map_err(|_| ApiError::InvalidPage),
        }
    }
}

/// One page of results with links to the neighbouring pages.
#[derive(Debug, Serialize)]
pub struct RecipePage {
    pub count: i64,
    pub next: Option<String>,
    pub previous: Option<String>,
    pub results: Vec<RecipeOut>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_lists_all_missing_fields() {
        let body = RecipeBody {
            title: None,
            description: Some("still optional".into()),
            ingredients: None,
            instructions: Some("".into()),
        };
        let err = body.validate().unwrap_err();
        match err {
            ApiError::Validation(fields) => {
                let names: Vec<_> = fields.iter().map(|f| f.field).collect();
                assert_eq!(names, vec!["title", "ingredients", "instructions"]);
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn validate_accepts_missing_description() {
        let body = RecipeBody {
            title: Some("Test Recipe".into()),
            description: None,
            ingredients: Some("Ingredient 1, Ingredient 2".into()),
            instructions: Some("Step 1, Step 2".into()),
        };
        let new = body.validate().expect("valid");
        assert_eq!(new.title, "Test Recipe");
        assert_eq!(new.description, None);
    }

    #[test]
    fn validate_keeps_serialized_json_ingredients_verbatim() {
        let body = RecipeBody {
            title: Some("Test Recipe".into()),
            description: None,
            ingredients: Some(r#"{"onion": "0.5kg", "tomatoes": "0.25kg"}"#.into()),
            instructions: Some("Step 1, Step 2".into()),
        };
        let new = body.validate().expect("valid");
        assert_eq!(new.ingredients, r#"{"onion": "0.5kg", "tomatoes": "0.25kg"}"#);
    }

    #[test]
    fn page_defaults_to_one() {
        let q = ListQuery {
            search: None,
            page: None,
        };
        assert_eq!(q.page().expect("default page"), 1);
    }

    #[test]
    fn page_parses_numeric_text() {
        let q = ListQuery {
            search: Some("Chicken".into()),
            page: Some("2".into()),
        };
        assert_eq!(q.page().expect("numeric page"), 2);
    }

    #[test]
    fn non_numeric_page_is_an_invalid_page() {
        let q = ListQuery {
            search: None,
            page: Some("abc".into()),
        };
        assert!(matches!(q.page().unwrap_err(), ApiError::InvalidPage));
    }

    #[test]
    fn recipe_out_hides_owner() {
        let out = RecipeOut {
            id: Uuid::new_v4(),
            title: "Chicken Curry".into(),
            description: None,
            ingredients: "chicken, onions".into(),
            instructions: "cook".into(),
        };
        let json = serde_json::to_string(&out).unwrap();
        assert!(!json.contains("created_by"));
    }
}
