//! Rules of the `standard` rule set, one per file.

mod blank_line_before_declaration;
mod chain_wrapping;
mod parameter_list_spacing;

pub use blank_line_before_declaration::BlankLineBeforeDeclarationRule;
pub use chain_wrapping::ChainWrappingRule;
pub use parameter_list_spacing::ParameterListSpacingRule;
