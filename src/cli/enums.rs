//! CLI enum types for style categories.

use clap::ValueEnum;

use twin_studio::category::Category;

/// Style category accepted on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum CategoryArg {
    #[default]
    Hair,
    Makeup,
    Nails,
    Scene,
    Wardrobe,
    LuxuryCars,
    General,
}

impl From<CategoryArg> for Category {
    fn from(c: CategoryArg) -> Self {
        match c {
            CategoryArg::Hair => Category::Hair,
            CategoryArg::Makeup => Category::Makeup,
            CategoryArg::Nails => Category::Nails,
            CategoryArg::Scene => Category::Scene,
            CategoryArg::Wardrobe => Category::Wardrobe,
            CategoryArg::LuxuryCars => Category::LuxuryCars,
            CategoryArg::General => Category::General,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_arg_to_category() {
        assert_eq!(Category::from(CategoryArg::Hair), Category::Hair);
        assert_eq!(Category::from(CategoryArg::LuxuryCars), Category::LuxuryCars);
        assert_eq!(Category::from(CategoryArg::General), Category::General);
    }

    #[test]
    fn test_category_arg_values_are_kebab_case() {
        let value = CategoryArg::LuxuryCars.to_possible_value().unwrap();
        assert_eq!(value.get_name(), "luxury-cars");
    }
}
