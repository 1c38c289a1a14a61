#![allow(dead_code)]

pub(crate) use fieldmap::{ErrorKind, FieldBinding, MapError, Mapper, MappingCache, Record};
pub(crate) use std::collections::BTreeMap;
pub(crate) use std::sync::Arc;

pub(crate) const NAME: &str = "test";
pub(crate) const COUNT: i64 = 999;
pub(crate) const DIRECTION: &str = "up";

pub(crate) fn list() -> Vec<String> {
    vec!["a".into(), "b".into(), "c".into()]
}

// Local records, owned by the application.

#[derive(Debug, Clone, Default, PartialEq, Record)]
pub(crate) struct SystemDeepNested {
    #[fieldmap("direction2")]
    pub direction: String,
}

#[derive(Debug, Clone, Default, PartialEq, Record)]
pub(crate) struct SystemNested {
    #[fieldmap("direction")]
    pub direction: String,
    #[fieldmap("deep_nested")]
    pub deep_nested: SystemDeepNested,
}

#[derive(Debug, Clone, Default, PartialEq, Record)]
pub(crate) struct SystemNestedFromSlice {
    #[fieldmap("config.direction")]
    pub direction: String,
}

#[derive(Debug, Clone, Default, PartialEq, Record)]
pub(crate) struct SystemStruct {
    #[fieldmap("metadata.name_field")]
    pub name: String,
    #[fieldmap("config.some_count")]
    pub count: i64,
    #[fieldmap("metadata.flag")]
    pub flag: bool,
    #[fieldmap("config.some_list[0].config")]
    pub nested: SystemNested,
    #[fieldmap("config.some_list2[0].config")]
    pub nested_pointer: Option<SystemNested>,
    #[fieldmap("config.some_list[0].list")]
    pub listed_stuff: Vec<String>,
    #[fieldmap("config.some_list")]
    pub struct_slice: Vec<SystemNestedFromSlice>,
    pub untracked: String,
}

#[derive(Debug, Clone, Default, PartialEq, Record)]
pub(crate) struct NestedStructWithMultipleDestinations {
    #[fieldmap("child.direction,types<SecondaryApiObject>")]
    pub direction: String,
}

#[derive(Debug, Clone, Default, PartialEq, Record)]
pub(crate) struct SystemStructWithMultipleDestination {
    #[fieldmap("metadata.name_field,types<ApiObject|SecondaryApiObject>")]
    pub name: String,
    #[fieldmap("+,types<ApiObject:metadata.flag|SecondaryApiObject:config_flag>")]
    pub flag: bool,
    #[fieldmap("dismiss,types<InexistentType>")]
    pub blackhole: String,
    #[fieldmap("->")]
    pub dismiss_nested: NestedStructWithMultipleDestinations,
    #[fieldmap("->")]
    pub dismiss_nested_pointer: Option<NestedStructWithMultipleDestinations>,
}

/// Flat local record whose fields all round-trip exactly through `ApiObject`.
#[derive(Debug, Clone, Default, PartialEq, Record)]
pub(crate) struct Machine {
    #[fieldmap("metadata.name_field")]
    pub name: String,
    #[fieldmap("metadata.flag")]
    pub flag: bool,
    #[fieldmap("config.some_count")]
    pub count: i64,
    #[fieldmap("config.some_pointed.config.direction")]
    pub direction: Option<String>,
    #[fieldmap("config.labels")]
    pub labels: BTreeMap<String, String>,
}

// Foreign records, owned by some external API.

#[derive(Debug, Clone, Default, PartialEq, Record)]
pub(crate) struct ApiDeepNested {
    pub direction2: String,
}

#[derive(Debug, Clone, Default, PartialEq, Record)]
pub(crate) struct ApiListedObjConfig {
    pub deep_nested: ApiDeepNested,
    pub direction: String,
}

#[derive(Debug, Clone, Default, PartialEq, Record)]
pub(crate) struct ApiListedObj {
    pub list: Vec<String>,
    pub config: ApiListedObjConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Record)]
pub(crate) struct ApiMetadata {
    pub name_field: String,
    pub flag: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Record)]
pub(crate) struct ApiConfig {
    pub some_count: i64,
    pub some_list: Vec<ApiListedObj>,
    pub some_list2: Vec<Option<ApiListedObj>>,
    pub some_pointed: Option<Box<ApiListedObj>>,
    pub labels: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, PartialEq, Record)]
pub(crate) struct ApiObject {
    pub metadata: ApiMetadata,
    pub config: ApiConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Record)]
pub(crate) struct SecondaryApiObjectChild {
    pub direction: String,
}

#[derive(Debug, Clone, Default, PartialEq, Record)]
pub(crate) struct SecondaryApiObject {
    pub metadata: ApiMetadata,
    pub config_flag: bool,
    pub child: SecondaryApiObjectChild,
}

/// Foreign record matched by `types<...>` rules under its renamed name.
#[derive(Debug, Clone, Default, PartialEq, Record)]
#[fieldmap(rename = "ApiObjectV2")]
pub(crate) struct RenamedApiObject {
    pub metadata: ApiMetadata,
}

pub(crate) fn populated_api_object() -> ApiObject {
    ApiObject {
        metadata: ApiMetadata {
            name_field: NAME.into(),
            flag: true,
        },
        config: ApiConfig {
            some_count: COUNT,
            some_list: vec![ApiListedObj {
                list: list(),
                config: ApiListedObjConfig {
                    direction: DIRECTION.into(),
                    deep_nested: ApiDeepNested {
                        direction2: DIRECTION.into(),
                    },
                },
            }],
            some_list2: vec![Some(ApiListedObj {
                config: ApiListedObjConfig {
                    direction: DIRECTION.into(),
                    ..ApiListedObjConfig::default()
                },
                ..ApiListedObj::default()
            })],
            ..ApiConfig::default()
        },
    }
}
