use fieldmap::Record;

#[derive(Clone, Default, Record)]
#[fieldmap(rename = "")]
struct ApiObject {
    name: String,
}

fn main() {}
