use fieldmap::Record;

#[derive(Clone, Default, Record)]
struct Machine {
    #[fieldmap(path = "metadata.name")]
    name: String,
}

fn main() {}
