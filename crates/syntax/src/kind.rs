/// Element type of a node in the syntax tree.
///
/// Composite kinds group other nodes; token kinds are leaves that carry text.
/// The vocabulary follows the Kotlin PSI element types the standard rules are
/// written against, but the tree itself does not enforce any grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[non_exhaustive]
pub enum SyntaxKind {
    // Composite nodes
    File,
    Class,
    ClassBody,
    ClassInitializer,
    ObjectDeclaration,
    ObjectLiteral,
    Fun,
    Property,
    PropertyAccessor,
    Block,
    FunctionLiteral,
    ValueArgumentList,
    ValueArgument,
    ValueParameterList,
    ValueParameter,
    ModifierList,
    AnnotationEntry,
    TypeReference,
    BinaryExpression,
    PrefixExpression,
    DotQualifiedExpression,
    SafeAccessExpression,
    OperationReference,
    CallExpression,
    When,
    Kdoc,

    // Trivia
    Whitespace,
    EolComment,
    BlockComment,

    // Tokens
    Identifier,
    Keyword,
    IntegerLiteral,
    StringLiteral,
    LBrace,
    RBrace,
    LPar,
    RPar,
    Comma,
    Colon,
    Eq,
    Dot,
    SafeAccess,
    Elvis,
    Arrow,
    Plus,
    Minus,
    Mul,
    Div,
    Perc,
    AndAnd,
    OrOr,
    ReturnKeyword,
    ElseKeyword,
}

impl SyntaxKind {
    /// Whitespace or comment.
    #[must_use]
    pub const fn is_trivia(self) -> bool {
        matches!(
            self,
            Self::Whitespace | Self::EolComment | Self::BlockComment | Self::Kdoc
        )
    }

    #[must_use]
    pub const fn is_whitespace(self) -> bool {
        matches!(self, Self::Whitespace)
    }

    #[must_use]
    pub const fn is_comment(self) -> bool {
        matches!(self, Self::EolComment | Self::BlockComment | Self::Kdoc)
    }

    /// Kinds that introduce a named declaration.
    #[must_use]
    pub const fn is_declaration(self) -> bool {
        matches!(
            self,
            Self::Class
                | Self::ClassInitializer
                | Self::Fun
                | Self::ObjectDeclaration
                | Self::Property
                | Self::PropertyAccessor
        )
    }

    /// Operator tokens of binary and assignment expressions.
    #[must_use]
    pub const fn is_operation(self) -> bool {
        matches!(
            self,
            Self::Eq
                | Self::Plus
                | Self::Minus
                | Self::Mul
                | Self::Div
                | Self::Perc
                | Self::AndAnd
                | Self::OrOr
                | Self::Elvis
        )
    }

    /// Upper snake case name, as used in tree dumps.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::File => "FILE",
            Self::Class => "CLASS",
            Self::ClassBody => "CLASS_BODY",
            Self::ClassInitializer => "CLASS_INITIALIZER",
            Self::ObjectDeclaration => "OBJECT_DECLARATION",
            Self::ObjectLiteral => "OBJECT_LITERAL",
            Self::Fun => "FUN",
            Self::Property => "PROPERTY",
            Self::PropertyAccessor => "PROPERTY_ACCESSOR",
            Self::Block => "BLOCK",
            Self::FunctionLiteral => "FUNCTION_LITERAL",
            Self::ValueArgumentList => "VALUE_ARGUMENT_LIST",
            Self::ValueArgument => "VALUE_ARGUMENT",
            Self::ValueParameterList => "VALUE_PARAMETER_LIST",
            Self::ValueParameter => "VALUE_PARAMETER",
            Self::ModifierList => "MODIFIER_LIST",
            Self::AnnotationEntry => "ANNOTATION_ENTRY",
            Self::TypeReference => "TYPE_REFERENCE",
            Self::BinaryExpression => "BINARY_EXPRESSION",
            Self::PrefixExpression => "PREFIX_EXPRESSION",
            Self::DotQualifiedExpression => "DOT_QUALIFIED_EXPRESSION",
            Self::SafeAccessExpression => "SAFE_ACCESS_EXPRESSION",
            Self::OperationReference => "OPERATION_REFERENCE",
            Self::CallExpression => "CALL_EXPRESSION",
            Self::When => "WHEN",
            Self::Kdoc => "KDOC",
            Self::Whitespace => "WHITE_SPACE",
            Self::EolComment => "EOL_COMMENT",
            Self::BlockComment => "BLOCK_COMMENT",
            Self::Identifier => "IDENTIFIER",
            Self::Keyword => "KEYWORD",
            Self::IntegerLiteral => "INTEGER_LITERAL",
            Self::StringLiteral => "STRING_LITERAL",
            Self::LBrace => "LBRACE",
            Self::RBrace => "RBRACE",
            Self::LPar => "LPAR",
            Self::RPar => "RPAR",
            Self::Comma => "COMMA",
            Self::Colon => "COLON",
            Self::Eq => "EQ",
            Self::Dot => "DOT",
            Self::SafeAccess => "SAFE_ACCESS",
            Self::Elvis => "ELVIS",
            Self::Arrow => "ARROW",
            Self::Plus => "PLUS",
            Self::Minus => "MINUS",
            Self::Mul => "MUL",
            Self::Div => "DIV",
            Self::Perc => "PERC",
            Self::AndAnd => "ANDAND",
            Self::OrOr => "OROR",
            Self::ReturnKeyword => "RETURN_KEYWORD",
            Self::ElseKeyword => "ELSE_KEYWORD",
        }
    }
}

impl std::fmt::Display for SyntaxKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
