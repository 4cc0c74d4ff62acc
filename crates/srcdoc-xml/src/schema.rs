//! The `xml_node!` schema macro
//!
//! One declaration per element type expands into the struct itself,
//! the decode hooks the driver calls, the position-lookup descent, and
//! the XML encoder. Member kinds:
//!
//! - `attr field: Type => ("tag", "usage-key", required|omitempty);`
//! - `elem field: Type => ("tag", "usage-key", required|omitempty);`
//! - `list field: Type => ("tag", "usage-key", required|omitempty);`
//! - `cdata field: Type => ("usage-key", omitempty);`
//! - `content field: Type => ("usage-key", omitempty);`
//! - `extra field: Type => ();` (not part of the schema, default-initialized)
//!
//! `attr` and `elem` members are stored as `Option<Type>`, `list` as
//! `Vec<Type>` (appended in source order), `extra` verbatim.
//!
//! `tag = …, usage = …, encode = manual;` suppresses the generated
//! [`EncodeXml`](crate::writer::EncodeXml) impl for nodes whose
//! serialization does not follow member order (rich text bodies).

/// Declare an XML schema node
#[macro_export]
macro_rules! xml_node {
    (
        $(#[$smeta:meta])*
        pub struct $name:ident {
            tag = $tag:literal, usage = $usage:literal, encode = manual;
            $($members:tt)*
        }
    ) => {
        $crate::xml_node!(@define
            $(#[$smeta])*
            pub struct $name {
                tag = $tag, usage = $usage;
                $($members)*
            }
        );
    };

    (
        $(#[$smeta:meta])*
        pub struct $name:ident {
            tag = $tag:literal, usage = $usage:literal;
            $($members:tt)*
        }
    ) => {
        $crate::xml_node!(@define
            $(#[$smeta])*
            pub struct $name {
                tag = $tag, usage = $usage;
                $($members)*
            }
        );
        $crate::xml_node!(@encode
            pub struct $name {
                tag = $tag, usage = $usage;
                $($members)*
            }
        );
    };

    (@define
        $(#[$smeta:meta])*
        pub struct $name:ident {
            tag = $tag:literal, usage = $usage:literal;
            $(
                $(#[$fmeta:meta])*
                $kind:ident $field:ident : $fty:ty => ( $($args:tt)* );
            )*
        }
    ) => {
        $(#[$smeta])*
        #[derive(Debug, Clone, Default, PartialEq, ::serde::Serialize)]
        pub struct $name {
            /// Element bookkeeping: range, tag names, usage key
            pub base: $crate::decode::NodeBase,
            $(
                $(#[$fmeta])*
                pub $field: $crate::__xml_storage!($kind $fty),
            )*
        }

        impl $crate::decode::DecodeXml for $name {
            fn tag_name() -> &'static str {
                $tag
            }

            fn node(&self) -> &$crate::decode::NodeBase {
                &self.base
            }

            fn node_mut(&mut self) -> &mut $crate::decode::NodeBase {
                &mut self.base
            }

            fn decode_attr(
                &mut self,
                d: &mut $crate::decode::Decoder<'_, '_>,
                attr: &$crate::token::Attribute,
            ) -> bool {
                $(
                    if $crate::__xml_attr_arm!(self, d, attr, $kind $field [$fty] ( $($args)* )) {
                        return true;
                    }
                )*
                let _ = (d, attr);
                false
            }

            fn decode_child(
                &mut self,
                d: &mut $crate::decode::Decoder<'_, '_>,
                start: &$crate::token::StartElement,
            ) -> ::std::result::Result<bool, $crate::decode::Unwind> {
                $(
                    match $crate::__xml_child_arm!(self, d, start, $kind $field [$fty] ( $($args)* )) {
                        ::std::result::Result::Ok(true) => return ::std::result::Result::Ok(true),
                        ::std::result::Result::Ok(false) => {}
                        ::std::result::Result::Err(u) => return ::std::result::Result::Err(u),
                    }
                )*
                let _ = (d, start);
                ::std::result::Result::Ok(false)
            }

            fn decode_cdata(&mut self, value: &$crate::token::SpannedString) -> bool {
                $(
                    if $crate::__xml_cdata_arm!(self, value, $kind $field [$fty] ( $($args)* )) {
                        return true;
                    }
                )*
                let _ = value;
                false
            }

            fn decode_content(&mut self, value: &$crate::token::SpannedString) -> bool {
                $(
                    if $crate::__xml_content_arm!(self, value, $kind $field [$fty] ( $($args)* )) {
                        return true;
                    }
                )*
                let _ = value;
                false
            }

            fn check_required(
                &self,
                d: &mut $crate::decode::Decoder<'_, '_>,
                range: $crate::Range,
            ) {
                $( $crate::__xml_required_arm!(self, d, range, $kind $field ( $($args)* )); )*
                let _ = (d, range);
            }
        }

        impl $crate::search::Search for $name {
            fn search_tip(&self, pos: $crate::Position) -> ::std::option::Option<$crate::search::Tip> {
                if !self.base.range.contains(pos) {
                    return ::std::option::Option::None;
                }
                $(
                    if let ::std::option::Option::Some(tip) =
                        $crate::__xml_search_arm!(self, pos, $kind $field)
                    {
                        return ::std::option::Option::Some(tip);
                    }
                )*
                self.base.tip()
            }
        }
    };

    (@encode
        pub struct $name:ident {
            tag = $tag:literal, usage = $usage:literal;
            $(
                $(#[$fmeta:meta])*
                $kind:ident $field:ident : $fty:ty => ( $($args:tt)* );
            )*
        }
    ) => {
        impl $crate::writer::EncodeXml for $name {
            fn encode(&self, w: &mut $crate::writer::XmlWriter, tag: &str) {
                w.open(tag);
                $( $crate::__xml_encode_attr_arm!(self, w, $kind $field ( $($args)* )); )*
                $( $crate::__xml_encode_child_arm!(self, w, $kind $field ( $($args)* )); )*
                w.close(tag);
            }
        }
    };
}

/// Storage shape per member kind
#[doc(hidden)]
#[macro_export]
macro_rules! __xml_storage {
    (attr $t:ty) => { ::std::option::Option<$t> };
    (elem $t:ty) => { ::std::option::Option<$t> };
    (list $t:ty) => { ::std::vec::Vec<$t> };
    (cdata $t:ty) => { ::std::option::Option<$t> };
    (content $t:ty) => { ::std::option::Option<$t> };
    (extra $t:ty) => { $t };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __xml_attr_arm {
    ($self:ident, $d:ident, $attr:ident, attr $field:ident [$fty:ty] ( $tag:literal, $usage:literal, $req:ident )) => {{
        if $attr.name.local.value == $tag {
            $crate::decode::decode_attr_into::<$fty>(&mut $self.$field, $d, $attr, $usage);
            true
        } else {
            false
        }
    }};
    ($self:ident, $d:ident, $attr:ident, $kind:ident $field:ident [$fty:ty] ( $($args:tt)* )) => {
        false
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __xml_child_arm {
    ($self:ident, $d:ident, $start:ident, elem $field:ident [$fty:ty] ( $tag:literal, $usage:literal, $req:ident )) => {{
        if $start.name.local.value == $tag {
            match $crate::decode::decode_element::<$fty>($d, $start, $usage) {
                ::std::result::Result::Ok(v) => {
                    $self.$field = ::std::option::Option::Some(v);
                    ::std::result::Result::Ok(true)
                }
                ::std::result::Result::Err(u) => ::std::result::Result::Err(u),
            }
        } else {
            ::std::result::Result::Ok(false)
        }
    }};
    ($self:ident, $d:ident, $start:ident, list $field:ident [$fty:ty] ( $tag:literal, $usage:literal, $req:ident )) => {{
        if $start.name.local.value == $tag {
            match $crate::decode::decode_element::<$fty>($d, $start, $usage) {
                ::std::result::Result::Ok(v) => {
                    $self.$field.push(v);
                    ::std::result::Result::Ok(true)
                }
                ::std::result::Result::Err(u) => ::std::result::Result::Err(u),
            }
        } else {
            ::std::result::Result::Ok(false)
        }
    }};
    ($self:ident, $d:ident, $start:ident, $kind:ident $field:ident [$fty:ty] ( $($args:tt)* )) => {
        ::std::result::Result::Ok(false)
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __xml_cdata_arm {
    ($self:ident, $value:ident, cdata $field:ident [$fty:ty] ( $usage:literal, $req:ident )) => {{
        $self.$field = ::std::option::Option::Some(
            <$fty as $crate::decode::CDataMember>::from_cdata($value, $usage),
        );
        true
    }};
    ($self:ident, $value:ident, $kind:ident $field:ident [$fty:ty] ( $($args:tt)* )) => {
        false
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __xml_content_arm {
    ($self:ident, $value:ident, content $field:ident [$fty:ty] ( $usage:literal, $req:ident )) => {{
        $self.$field = ::std::option::Option::Some(
            <$fty as $crate::decode::ContentMember>::from_text($value, $usage),
        );
        true
    }};
    ($self:ident, $value:ident, $kind:ident $field:ident [$fty:ty] ( $($args:tt)* )) => {
        false
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __xml_required_arm {
    ($self:ident, $d:ident, $range:ident, attr $field:ident ( $tag:literal, $usage:literal, required )) => {
        if $self
            .$field
            .as_ref()
            .map_or(true, |a| $crate::decode::AttrDecoder::is_empty_value(a))
        {
            $d.required($range, $tag);
        }
    };
    ($self:ident, $d:ident, $range:ident, elem $field:ident ( $tag:literal, $usage:literal, required )) => {
        if $self.$field.is_none() {
            $d.required($range, $tag);
        }
    };
    ($self:ident, $d:ident, $range:ident, list $field:ident ( $tag:literal, $usage:literal, required )) => {
        if $self.$field.is_empty() {
            $d.required($range, $tag);
        }
    };
    ($self:ident, $d:ident, $range:ident, cdata $field:ident ( $usage:literal, required )) => {
        if $self.$field.is_none() {
            $d.required($range, "cdata");
        }
    };
    ($self:ident, $d:ident, $range:ident, content $field:ident ( $usage:literal, required )) => {
        if $self.$field.is_none() {
            $d.required($range, "content");
        }
    };
    ($self:ident, $d:ident, $range:ident, $kind:ident $field:ident ( $($args:tt)* )) => {};
}

#[doc(hidden)]
#[macro_export]
macro_rules! __xml_search_arm {
    ($self:ident, $pos:ident, extra $field:ident) => {
        ::std::option::Option::<$crate::search::Tip>::None
    };
    ($self:ident, $pos:ident, $kind:ident $field:ident) => {
        $crate::search::Search::search_tip(&$self.$field, $pos)
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __xml_encode_attr_arm {
    ($self:ident, $w:ident, attr $field:ident ( $tag:literal, $($rest:tt)* )) => {
        if let ::std::option::Option::Some(a) = &$self.$field {
            if !$crate::decode::AttrDecoder::is_empty_value(a) {
                $w.attr($tag, &$crate::decode::AttrDecoder::encode_value(a));
            }
        }
    };
    ($self:ident, $w:ident, $kind:ident $field:ident ( $($args:tt)* )) => {};
}

#[doc(hidden)]
#[macro_export]
macro_rules! __xml_encode_child_arm {
    ($self:ident, $w:ident, elem $field:ident ( $tag:literal, $($rest:tt)* )) => {
        if let ::std::option::Option::Some(e) = &$self.$field {
            $crate::writer::EncodeXml::encode(e, $w, $tag);
        }
    };
    ($self:ident, $w:ident, list $field:ident ( $tag:literal, $($rest:tt)* )) => {
        for item in &$self.$field {
            $crate::writer::EncodeXml::encode(item, $w, $tag);
        }
    };
    ($self:ident, $w:ident, cdata $field:ident ( $($rest:tt)* )) => {
        if let ::std::option::Option::Some(c) = &$self.$field {
            $w.cdata($crate::decode::CDataMember::cdata_text(c));
        }
    };
    ($self:ident, $w:ident, content $field:ident ( $($rest:tt)* )) => {
        if let ::std::option::Option::Some(c) = &$self.$field {
            $w.text($crate::decode::ContentMember::content_text(c));
        }
    };
    ($self:ident, $w:ident, $kind:ident $field:ident ( $($args:tt)* )) => {};
}
