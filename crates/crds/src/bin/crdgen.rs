//! Prints the CRD manifests owned by the Metal3Data controller as a
//! multi-document YAML stream.

use crds::{Metal3Data, Metal3DataClaim, Metal3DataTemplate};
use kube::CustomResourceExt;

fn main() -> Result<(), serde_yaml::Error> {
    let crds = [
        Metal3DataTemplate::crd(),
        Metal3Data::crd(),
        Metal3DataClaim::crd(),
    ];
    for crd in &crds {
        println!("---");
        print!("{}", serde_yaml::to_string(crd)?);
    }
    Ok(())
}
