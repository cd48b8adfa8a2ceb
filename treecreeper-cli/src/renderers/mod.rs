//! Renderers for every node kind the host graph model defines.
//!
//! Each renderer writes one complete JSON value for a node it has never
//! written before. Kinds without a renderer here (labels, expressions,
//! statement lists and other structural nodes) are written with
//! [`common::render_unsupported`].

pub mod common;
pub mod constants;
pub mod declarations;
pub mod scopes;
pub mod types;

use std::io::Write;

use treecreeper_graph::NodeKind;

use crate::serializers::Registry;

/// Install the standard renderers into `registry`.
pub fn register_all<W: Write>(registry: &mut Registry<W>) {
    // Declarations
    registry.register(NodeKind::ConstDecl, declarations::render_const_decl::<W>);
    registry.register(NodeKind::FieldDecl, declarations::render_field_decl::<W>);
    registry.register(NodeKind::FunctionDecl, declarations::render_function_decl::<W>);
    registry.register(NodeKind::NamespaceDecl, scopes::render_namespace::<W>);
    registry.register(
        NodeKind::TranslationUnitDecl,
        declarations::render_translation_unit_decl::<W>,
    );
    registry.register(NodeKind::TypeDecl, declarations::render_type_decl::<W>);
    registry.register(NodeKind::ParmDecl, declarations::render_var_decl::<W>);
    registry.register(NodeKind::ResultDecl, declarations::render_var_decl::<W>);
    registry.register(NodeKind::TemplateDecl, declarations::render_template_decl::<W>);
    registry.register(NodeKind::VarDecl, declarations::render_var_decl::<W>);

    // Types
    registry.register(NodeKind::ArrayType, types::render_array_type::<W>);
    registry.register(NodeKind::BooleanType, types::render_simple_type::<W>);
    registry.register(NodeKind::LangType, types::render_simple_type::<W>);
    registry.register(NodeKind::VoidType, types::render_simple_type::<W>);
    registry.register(NodeKind::ComplexType, types::render_complex_type::<W>);
    registry.register(NodeKind::EnumeralType, types::render_enumeral_type::<W>);
    registry.register(NodeKind::FixedPointType, types::render_fixed_point_type::<W>);
    registry.register(NodeKind::FunctionType, types::render_function_type::<W>);
    registry.register(NodeKind::MethodType, types::render_function_type::<W>);
    registry.register(NodeKind::IntegerType, types::render_integer_type::<W>);
    registry.register(NodeKind::NullptrType, types::render_pointer_type::<W>);
    registry.register(NodeKind::PointerType, types::render_pointer_type::<W>);
    registry.register(NodeKind::ReferenceType, types::render_pointer_type::<W>);
    registry.register(NodeKind::RealType, types::render_precisioned_type::<W>);
    registry.register(NodeKind::RecordType, types::render_record_type::<W>);
    registry.register(NodeKind::QualUnionType, types::render_record_type::<W>);
    registry.register(NodeKind::UnionType, types::render_record_type::<W>);
    registry.register(NodeKind::VectorType, types::render_vector_type::<W>);

    // Constants
    registry.register(NodeKind::ComplexCst, constants::render_complex_constant::<W>);
    registry.register(NodeKind::IntegerCst, constants::render_integer_constant::<W>);
    registry.register(NodeKind::FixedCst, constants::render_fixed_point_constant::<W>);
    registry.register(NodeKind::RealCst, constants::render_real_constant::<W>);
    registry.register(NodeKind::StringCst, constants::render_string_constant::<W>);
    registry.register(NodeKind::VectorCst, constants::render_vector_constant::<W>);

    // Exceptional nodes
    registry.register(NodeKind::Block, scopes::render_block::<W>);
    registry.register(NodeKind::IdentifierNode, common::render_identifier::<W>);
}
