//! Describes the rendering types to an embedding scripting host.
//!
//! Each exposed type produces a [`ClassRegistration`] listing its
//! constructors, methods and fields. The host decides how to bind them; this
//! module never calls into a scripting runtime.

use crate::{Batch, Error, Shape, Sprite, SpriteBatch, TextureRegion, Vertex};

/// How instances of a class are owned by scripts.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ClassKind {
    /// Instances are copied on assignment.
    Value,
    /// Instances are shared and reference counted.
    Reference,
}

/// A method exposed to scripts.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Method {
    /// The name scripts call the method by.
    pub name: &'static str,
    /// The type of each parameter, in order.
    pub parameters: &'static [&'static str],
    /// The type returned, if any.
    pub returns: Option<&'static str>,
}

/// A field exposed to scripts.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Property {
    /// The name scripts access the field by.
    pub name: &'static str,
    /// The type of the field.
    pub type_name: &'static str,
}

/// Everything a scripting host needs to expose one type.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ClassRegistration {
    name: &'static str,
    kind: ClassKind,
    factories: Vec<&'static [&'static str]>,
    methods: Vec<Method>,
    properties: Vec<Property>,
}

impl ClassRegistration {
    /// Starts describing a value type named `name`.
    #[must_use]
    pub const fn value(name: &'static str) -> Self {
        Self::new(name, ClassKind::Value)
    }

    /// Starts describing a reference type named `name`.
    #[must_use]
    pub const fn reference(name: &'static str) -> Self {
        Self::new(name, ClassKind::Reference)
    }

    const fn new(name: &'static str, kind: ClassKind) -> Self {
        Self {
            name,
            kind,
            factories: Vec::new(),
            methods: Vec::new(),
            properties: Vec::new(),
        }
    }

    /// Builder-style function. Adds a constructor taking `parameters`.
    #[must_use]
    pub fn with_factory(mut self, parameters: &'static [&'static str]) -> Self {
        self.factories.push(parameters);
        self
    }

    /// Builder-style function. Adds a method.
    #[must_use]
    pub fn with_method(
        mut self,
        name: &'static str,
        parameters: &'static [&'static str],
        returns: Option<&'static str>,
    ) -> Self {
        self.methods.push(Method {
            name,
            parameters,
            returns,
        });
        self
    }

    /// Builder-style function. Adds a field.
    #[must_use]
    pub fn with_property(mut self, name: &'static str, type_name: &'static str) -> Self {
        self.properties.push(Property { name, type_name });
        self
    }

    /// The name of the class.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// How the class is owned.
    #[must_use]
    pub const fn kind(&self) -> ClassKind {
        self.kind
    }

    /// The parameter lists of every constructor.
    #[must_use]
    pub fn factories(&self) -> &[&'static [&'static str]] {
        &self.factories
    }

    /// The exposed methods.
    #[must_use]
    pub fn methods(&self) -> &[Method] {
        &self.methods
    }

    /// Returns the method named `name`.
    #[must_use]
    pub fn method(&self, name: &str) -> Option<&Method> {
        self.methods.iter().find(|method| method.name == name)
    }

    /// The exposed fields.
    #[must_use]
    pub fn properties(&self) -> &[Property] {
        &self.properties
    }
}

/// A scripting runtime that types can be registered with.
pub trait ScriptHost {
    /// Makes `class` available to scripts. Returns a description of the
    /// problem if the host cannot bind it.
    fn register_class(&mut self, class: ClassRegistration) -> Result<(), String>;
}

/// A type that can be exposed to scripts.
pub trait Scriptable {
    /// Describes this type.
    fn registration() -> ClassRegistration;
}

impl Scriptable for Vertex {
    fn registration() -> ClassRegistration {
        ClassRegistration::value("Vertex")
            .with_factory(&[])
            .with_property("position", "Vector2")
            .with_property("color", "Color")
            .with_property("tex_coord", "Vector2")
    }
}

impl Scriptable for TextureRegion {
    fn registration() -> ClassRegistration {
        ClassRegistration::value("TextureRegion")
            .with_factory(&[])
            .with_factory(&["Vector2", "Vector2"])
            .with_factory(&["float", "float", "float", "float"])
            .with_property("uv0", "Vector2")
            .with_property("uv1", "Vector2")
            .with_method("set_region", &["Vector2", "Vector2"], None)
            .with_method("size_in", &["Texture"], Some("Size"))
    }
}

impl Scriptable for Sprite {
    fn registration() -> ClassRegistration {
        ClassRegistration::reference("Sprite")
            .with_factory(&["Texture"])
            .with_method("set_position", &["Vector2"], None)
            .with_method("set_x", &["float"], None)
            .with_method("set_y", &["float"], None)
            .with_method("move_by", &["Vector2"], None)
            .with_method("set_size", &["Vector2"], None)
            .with_method("set_width", &["float"], None)
            .with_method("set_height", &["float"], None)
            .with_method("scale_size", &["float", "float"], None)
            .with_method("set_origin", &["Vector2"], None)
            .with_method("set_rotation", &["float"], None)
            .with_method("rotate", &["float"], None)
            .with_method("set_scale", &["float", "float"], None)
            .with_method("set_color", &["Color"], None)
            .with_method("set_region", &["TextureRegion", "bool"], None)
            .with_method("set_depth", &["float"], None)
            .with_method("set_texture", &["Texture"], None)
            .with_method("position", &[], Some("Vector2"))
            .with_method("size", &[], Some("Vector2"))
            .with_method("origin", &[], Some("Vector2"))
            .with_method("center", &[], Some("Vector2"))
            .with_method("rotation", &[], Some("float"))
            .with_method("scale", &[], Some("Vector2"))
            .with_method("color", &[], Some("Color"))
            .with_method("region", &[], Some("TextureRegion"))
            .with_method("depth", &[], Some("float"))
            .with_method("texture", &[], Some("Texture"))
            .with_method("aabb", &[], Some("array<Vector2>"))
            .with_method("draw", &["Batch"], None)
    }
}

impl Scriptable for Shape {
    fn registration() -> ClassRegistration {
        ClassRegistration::reference("Shape")
            .with_factory(&["Rect"])
            .with_factory(&["Vector2", "float", "int"])
            .with_factory(&["array<Vector2>"])
            .with_method("set_fill_color", &["Color"], None)
            .with_method("set_fill_texture", &["Texture"], None)
            .with_method("set_pen_color", &["Color"], None)
            .with_method("set_pen_size", &["float"], None)
            .with_method("draw", &["Batch"], None)
    }
}

impl Scriptable for Batch {
    fn registration() -> ClassRegistration {
        ClassRegistration::reference("Batch")
            .with_factory(&[])
            .with_method("set_projection_matrix", &["Matrix4"], None)
            .with_method("set_shader", &["Shader"], None)
            .with_method("set_texture", &["Texture"], None)
            .with_method("set_blend_state", &["BlendState"], None)
            .with_method("projection_matrix", &[], Some("Matrix4"))
            .with_method("shader", &[], Some("Shader"))
            .with_method("texture", &[], Some("Texture"))
            .with_method("add_vertices", &["array<Vertex>", "array<uint>"], None)
            .with_method("vertex", &["int"], Some("Vertex"))
            .with_method("modify_vertex", &["int", "Vertex"], None)
            .with_method("draw", &[], None)
            .with_method("clear", &[], None)
            .with_method("make_static", &[], None)
    }
}

impl Scriptable for SpriteBatch {
    fn registration() -> ClassRegistration {
        ClassRegistration::reference("SpriteBatch")
            .with_factory(&[])
            .with_method("set_projection_matrix", &["Matrix4"], None)
            .with_method("set_shader", &["Shader"], None)
            .with_method("set_blend_state", &["BlendState"], None)
            .with_method("add", &["Sprite"], None)
            .with_method("get", &["int"], Some("Sprite"))
            .with_method("len", &[], Some("int"))
            .with_method("draw", &[], None)
            .with_method("clear", &[], None)
            .with_method("make_static", &[], None)
    }
}

/// Registers every scriptable type with `host`. Value types are registered
/// before the reference types whose methods use them.
pub fn register_all(host: &mut dyn ScriptHost) -> crate::Result<()> {
    let classes = [
        Vertex::registration(),
        TextureRegion::registration(),
        Batch::registration(),
        Sprite::registration(),
        Shape::registration(),
        SpriteBatch::registration(),
    ];

    for class in classes.iter().cloned() {
        let name = class.name();
        host.register_class(class)
            .map_err(|reason| Error::Registration(format!("{}: {}", name, reason)))?;
        tracing::debug!(class = name, "registered script class");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[derive(Default)]
    struct RecordingHost {
        classes: Vec<ClassRegistration>,
        rejected: HashSet<&'static str>,
    }

    impl ScriptHost for RecordingHost {
        fn register_class(&mut self, class: ClassRegistration) -> Result<(), String> {
            if self.rejected.contains(class.name()) {
                return Err(String::from("unsupported"));
            }
            if self.classes.iter().any(|known| known.name() == class.name()) {
                return Err(String::from("already registered"));
            }
            self.classes.push(class);
            Ok(())
        }
    }

    #[test]
    fn registers_values_first() {
        let mut host = RecordingHost::default();
        register_all(&mut host).unwrap();

        let kinds = host.classes.iter().map(ClassRegistration::kind).collect::<Vec<_>>();
        let first_reference = kinds
            .iter()
            .position(|kind| *kind == ClassKind::Reference)
            .unwrap();
        assert!(kinds[first_reference..]
            .iter()
            .all(|kind| *kind == ClassKind::Reference));
        assert_eq!(host.classes.len(), 6);
    }

    #[test]
    fn describes_sprite_batch() {
        let class = SpriteBatch::registration();
        assert_eq!(class.kind(), ClassKind::Reference);
        assert_eq!(class.factories().len(), 1);
        assert!(class.factories()[0].is_empty());
        let get = class.method("get").unwrap();
        assert_eq!(get.parameters, &["int"]);
        assert_eq!(get.returns, Some("Sprite"));
        assert!(class.method("add_vertices").is_none());
    }

    #[test]
    fn shape_exposes_pen() {
        let class = Shape::registration();
        assert_eq!(class.method("set_pen_color").unwrap().parameters, &["Color"]);
        assert_eq!(class.method("set_pen_size").unwrap().parameters, &["float"]);
    }

    #[test]
    fn vertex_fields() {
        let class = Vertex::registration();
        let names = class
            .properties()
            .iter()
            .map(|property| property.name)
            .collect::<Vec<_>>();
        assert_eq!(names, vec!["position", "color", "tex_coord"]);
    }

    #[test]
    fn rejection_is_reported() {
        let mut host = RecordingHost::default();
        host.rejected.insert("Sprite");
        let error = register_all(&mut host).unwrap_err();
        assert!(matches!(&error, Error::Registration(reason) if reason.starts_with("Sprite")));
        assert_eq!(host.classes.len(), 3);
    }

    #[test]
    fn duplicate_registration_fails() {
        let mut host = RecordingHost::default();
        register_all(&mut host).unwrap();
        assert!(register_all(&mut host).is_err());
    }
}
