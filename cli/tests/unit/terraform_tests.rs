//! Argument construction of the `terraform` adapter.

use std::path::Path;

use infractl::application::ports::DeclarativeTool;
use infractl::infra::terraform::Terraform;

use crate::mocks::MockCommandRunner;

fn strings(args: &[&str]) -> Vec<String> {
    args.iter().map(ToString::to_string).collect()
}

#[tokio::test]
async fn every_command_runs_in_the_terraform_dir() {
    let mock = MockCommandRunner::new();
    let tf = Terraform::new(mock.clone(), "infra/terraform");

    tf.init().await.expect("init");
    tf.state_list().await.expect("state list");
    tf.plan("tfplan").await.expect("plan");

    for call in mock.calls() {
        assert_eq!(call.program, "terraform");
        assert_eq!(call.cwd.as_deref(), Some(Path::new("infra/terraform")));
    }
}

#[tokio::test]
async fn lifecycle_argv() {
    let mock = MockCommandRunner::new();
    let tf = Terraform::new(mock.clone(), "terraform");

    tf.init().await.expect("init");
    tf.plan("tfplan").await.expect("plan");
    tf.apply("tfplan").await.expect("apply");

    assert_eq!(
        mock.argv(),
        vec![
            strings(&["init", "-input=false"]),
            strings(&["plan", "-input=false", "-out=tfplan"]),
            strings(&["apply", "-input=false", "-auto-approve", "tfplan"]),
        ]
    );
    assert!(mock.calls().iter().all(|c| c.streamed));
}

#[tokio::test]
async fn import_passes_address_and_id_as_separate_args() {
    let mock = MockCommandRunner::new();
    let tf = Terraform::new(mock.clone(), "terraform");
    let id = "/subscriptions/s/resourceGroups/a b/providers/x|/y";

    tf.import("azurerm_network_interface_security_group_association.nic_nsg", id)
        .await
        .expect("import");

    assert_eq!(
        mock.argv()[0],
        strings(&[
            "import",
            "-input=false",
            "azurerm_network_interface_security_group_association.nic_nsg",
            id,
        ])
    );
}

#[tokio::test]
async fn destroy_initializes_then_passes_owner_tag() {
    let mock = MockCommandRunner::new();
    let tf = Terraform::new(mock.clone(), "terraform");

    tf.destroy("alice").await.expect("destroy");

    assert_eq!(
        mock.argv(),
        vec![
            strings(&["init", "-input=false"]),
            strings(&[
                "destroy",
                "-auto-approve",
                "-input=false",
                "-var",
                "owner_tag=alice"
            ]),
        ]
    );
}

#[tokio::test]
async fn non_zero_streamed_exit_is_an_error() {
    let mock = MockCommandRunner::new().then(1, "");
    let tf = Terraform::new(mock, "terraform");

    let err = tf.plan("tfplan").await.expect_err("plan must fail");
    assert!(err.to_string().contains("terraform plan"));
}

#[tokio::test]
async fn state_list_returns_raw_listing() {
    let mock = MockCommandRunner::new().then(0, "azurerm_resource_group.rg\nazurerm_subnet.subnet\n");
    let tf = Terraform::new(mock.clone(), "terraform");

    let listing = tf.state_list().await.expect("state list");

    assert!(listing.lines().any(|l| l == "azurerm_subnet.subnet"));
    assert_eq!(mock.argv()[0], strings(&["state", "list"]));
}

#[tokio::test]
async fn missing_output_is_none() {
    let mock = MockCommandRunner::new().then(1, "").then(0, "20.1.2.3");
    let tf = Terraform::new(mock.clone(), "terraform");

    assert_eq!(tf.output("server_public_ip").await.expect("output"), None);
    assert_eq!(
        tf.output("server_public_ip").await.expect("output").as_deref(),
        Some("20.1.2.3")
    );
    assert_eq!(mock.argv()[0], strings(&["output", "-raw", "server_public_ip"]));
}

#[tokio::test]
async fn force_unlock_argv() {
    let mock = MockCommandRunner::new();
    let tf = Terraform::new(mock.clone(), "terraform");

    tf.force_unlock("1234-abcd").await.expect("unlock");

    assert_eq!(mock.argv()[0], strings(&["force-unlock", "-force", "1234-abcd"]));
}
