use fingerarray::persistent::{Array, ArrayBuilder};

fn main() {
    let mut builder: ArrayBuilder<i32> = ArrayBuilder::new();
    builder.append(1);
    let array: Array<i32> = builder.freeze();
    builder.append(2);
    assert_eq!(array.len(), 1);
}
