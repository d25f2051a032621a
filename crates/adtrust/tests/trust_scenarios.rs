//! Trust scenarios driven against a scripted master + client + AD lab.

use std::sync::Arc;
use std::time::Duration;

use trustcheck_core::config::AdTrustConfig;
use trustcheck_core::types::HostRole;
use trustcheck_runner::report::{Phase, ScenarioOutcome, ScenarioReport};
use trustcheck_runner::runner::{RunnerSettings, ScenarioRunner};
use trustcheck_runner::poll::WaitStrategy;
use trustcheck_runner::scenario::DynScenario;
use trustcheck_runner::testing::{Reply, ScriptedHost, topology_of};

use trustcheck_adtrust::scenarios::{
    BasicSssctlList, EnforceGid, HonourIdOverride, IpaServerSssCacheUser,
    MissingSecondaryPosixGroups, NssGetByNameWithPrivateGroup,
};

const SSSD_CONF: &str = "[domain/ipa.test]\nid_provider = ipa\n\n[sssd]\nservices = nss, pam\ndomains = ipa.test\n";

struct Lab {
    master: Arc<ScriptedHost>,
    client: Arc<ScriptedHost>,
    ad: Arc<ScriptedHost>,
}

impl Lab {
    fn new(master: ScriptedHost, client: ScriptedHost, ad: ScriptedHost) -> Self {
        Self {
            master: master.shared(),
            client: client.shared(),
            ad: ad.shared(),
        }
    }

    async fn run(&self, scenario: &dyn DynScenario) -> ScenarioReport {
        let topology = topology_of(&[
            Arc::clone(&self.master),
            Arc::clone(&self.client),
            Arc::clone(&self.ad),
        ])
        .unwrap();
        let settings = RunnerSettings {
            propagation: WaitStrategy::UntilReady {
                timeout: Duration::from_secs(10),
                interval: Duration::from_secs(1),
            },
            poll_interval: Duration::ZERO,
            stop_on_first_failure: false,
        };
        ScenarioRunner::new(topology, settings).run(scenario).await
    }
}

fn master() -> ScriptedHost {
    ScriptedHost::new("master0", HostRole::Master).on("cat /etc/sssd/sssd.conf", Reply::ok(SSSD_CONF))
}

fn client() -> ScriptedHost {
    ScriptedHost::new("client0", HostRole::Client).with_hostname("client0.ipa.test")
}

fn ad() -> ScriptedHost {
    ScriptedHost::new("ad0", HostRole::Ad).with_domain("ad.test")
}

fn failure_message(report: &ScenarioReport) -> &str {
    match &report.outcome {
        ScenarioOutcome::Failed { failure } => &failure.message,
        other => panic!("expected Failed, got {other:?}"),
    }
}

fn command_index(report: &ScenarioReport, pattern: &str) -> usize {
    report
        .commands
        .iter()
        .position(|c| c.command.contains(pattern))
        .unwrap_or_else(|| panic!("no command containing {pattern:?}"))
}

#[tokio::test]
async fn sssctl_lists_ad_domain() {
    let lab = Lab::new(
        master().on("sssctl domain-list", Reply::ok("ipa.test\nad.test\n")),
        client(),
        ad(),
    );

    let report = lab.run(&BasicSssctlList).await;

    assert_eq!(report.outcome, ScenarioOutcome::Passed);
    assert_eq!(lab.master.count("sssctl domain-list"), 1);
}

#[tokio::test]
async fn sssctl_subdomain_does_not_count_as_ad_domain() {
    let lab = Lab::new(
        master().on("sssctl domain-list", Reply::ok("ipa.test\nchild.ad.test\n")),
        client(),
        ad(),
    );

    let report = lab.run(&BasicSssctlList).await;

    assert_eq!(
        failure_message(&report),
        "sssctl domain-list does not list the AD domain"
    );
}

#[tokio::test]
async fn missing_ad_domain_is_a_precondition_error() {
    let lab = Lab::new(master(), client(), ScriptedHost::new("ad0", HostRole::Ad));

    let report = lab.run(&BasicSssctlList).await;

    match &report.outcome {
        ScenarioOutcome::Errored { error } => assert!(error.contains("precondition"), "{error}"),
        other => panic!("expected Errored, got {other:?}"),
    }
    assert!(lab.master.history().is_empty());
}

#[tokio::test]
async fn administrator_is_looked_up_in_master_cache() {
    let lab = Lab::new(
        master().on(
            "ldbsearch",
            Reply::ok("# record 1\ndn: name=Administrator@ad.test,cn=users,cn=ad.test,cn=sysdb\n# returned 1 records\n"),
        ),
        client(),
        ad(),
    );

    let report = lab.run(&IpaServerSssCacheUser).await;

    assert_eq!(report.outcome, ScenarioOutcome::Passed);
    assert_eq!(lab.client.count("id 'Administrator@ad.test'"), 1);
    assert_eq!(
        lab.master.count("ldbsearch -H '/var/lib/sss/db/cache_ipa.test.ldb'"),
        1
    );
    assert!(command_index(&report, "ldbsearch") > command_index(&report, "id 'Administrator"));
}

#[tokio::test]
async fn empty_cache_search_fails() {
    let lab = Lab::new(
        master().on("ldbsearch", Reply::ok("# returned 0 records\n")),
        client(),
        ad(),
    );

    let report = lab.run(&IpaServerSssCacheUser).await;

    assert_eq!(failure_message(&report), "AD user is not cached on the IPA server");
}

#[tokio::test(start_paused = true)]
async fn enforce_gid_overrides_then_reverts() {
    // Given: the client reports the overridden gid until the view is deleted
    let overridden = "uid=500(administrator@ad.test) gid=40000000(domain users@ad.test) groups=40000000(domain users@ad.test)";
    let reverted = "uid=500(administrator@ad.test) gid=1234400513(domain users@ad.test)";
    let lab = Lab::new(
        master(),
        client().on_sequence(
            "id 'Administrator@ad.test'",
            vec![Reply::ok(overridden), Reply::ok(overridden), Reply::ok(reverted)],
        ),
        ad(),
    );

    // When
    let report = lab.run(&EnforceGid::new(&AdTrustConfig::default())).await;

    // Then: view created, applied to the client's hostname and deleted exactly once
    assert_eq!(report.outcome, ScenarioOutcome::Passed);
    assert_eq!(lab.master.count("ipa idview-add 'foo_bar'"), 1);
    assert_eq!(
        lab.master
            .count("ipa idoverridegroup-add 'foo_bar' 'Domain Users@ad.test' --gid=40000000"),
        1
    );
    assert_eq!(
        lab.master.count("ipa idview-apply 'foo_bar' --hosts='client0.ipa.test'"),
        1
    );
    assert_eq!(lab.master.count("ipa idview-del 'foo_bar'"), 1);
    assert_eq!(lab.client.count("systemctl start sssd"), 3);

    let deleted = command_index(&report, "idview-del");
    assert_eq!(report.commands[deleted].phase, Phase::Exercise);
    assert_eq!(report.teardown.executed, 3);
}

#[tokio::test(start_paused = true)]
async fn enforce_gid_failed_apply_still_deletes_view() {
    let lab = Lab::new(
        master().on("idview-apply", Reply::fail(1, "no matching host")),
        client(),
        ad(),
    );

    let report = lab.run(&EnforceGid::new(&AdTrustConfig::default())).await;

    match &report.outcome {
        ScenarioOutcome::Errored { error } => assert!(error.contains("no matching host"), "{error}"),
        other => panic!("expected Errored, got {other:?}"),
    }
    assert_eq!(lab.master.count("ipa idview-del 'foo_bar'"), 1);
    assert_eq!(lab.client.count("id 'Administrator"), 0);
}

#[tokio::test(start_paused = true)]
async fn enforce_gid_not_applied_fails_with_output() {
    // Given: the client never reports the overridden gid
    let lab = Lab::new(
        master(),
        client().on(
            "id 'Administrator@ad.test'",
            Reply::ok("uid=500(administrator@ad.test) gid=1234400513(domain users@ad.test)"),
        ),
        ad(),
    );

    // When
    let report = lab.run(&EnforceGid::new(&AdTrustConfig::default())).await;

    // Then: the readiness wait gives up and the assertion reports what was seen
    match &report.outcome {
        ScenarioOutcome::Failed { failure } => {
            assert_eq!(failure.message, "Overridden gid of Domain Users is not enforced");
            assert!(failure.expected.contains("40000000(domain users@ad.test)"));
            assert!(failure.stdout.contains("gid=1234400513"));
        }
        other => panic!("expected Failed, got {other:?}"),
    }
    assert_eq!(lab.master.count("ipa idview-del 'foo_bar'"), 1);
}

#[tokio::test(start_paused = true)]
async fn posix_unresolvable_user_fails_with_setup_message() {
    let lab = posix_lab(vec![Reply::fail(1, "id: 'testuser': no such user")]);

    let report = lab
        .run(&MissingSecondaryPosixGroups::new(&AdTrustConfig::default()))
        .await;

    match &report.outcome {
        ScenarioOutcome::Failed { failure } => {
            assert_eq!(
                failure.message,
                "Could not find the user, something wrong with setup!"
            );
            assert_eq!(failure.exit_code, Some(1));
        }
        other => panic!("expected Failed, got {other:?}"),
    }
    assert_eq!(report.teardown.executed, 7);
}

#[tokio::test(start_paused = true)]
async fn idoverride_unresolvable_user_fails_with_setup_message() {
    let lab = Lab::new(
        master().on("id -g ", Reply::fail(1, "id: no such user")),
        client(),
        ad(),
    );

    let report = lab.run(&HonourIdOverride::new(&AdTrustConfig::default())).await;

    assert_eq!(
        failure_message(&report),
        "Could not find the user, something wrong with setup!"
    );
    assert_eq!(lab.master.count("idview-add"), 0);
    assert_eq!(lab.ad.count("Remove-ADUser"), 1);
}

fn idoverride_lab(client_gids: Vec<Reply>) -> Lab {
    Lab::new(
        master().on("id -g ", Reply::ok("1234400513\n")),
        client()
            .on("id -u ", Reply::ok("50001\n"))
            .on_sequence("id -g ", client_gids),
        ad(),
    )
}

#[tokio::test(start_paused = true)]
async fn stale_gid_never_observed() {
    let lab = idoverride_lab(vec![Reply::ok("50000\n")]);

    let report = lab.run(&HonourIdOverride::new(&AdTrustConfig::default())).await;

    assert_eq!(report.outcome, ScenarioOutcome::Passed);
    let stale = &report.polls[0];
    assert_eq!(stale.label, "stale gid");
    assert_eq!(stale.counts.attempts, 50);
    assert_eq!(stale.counts.matches, 0);
    assert_eq!(lab.client.count("id -g "), 50);
}

#[tokio::test(start_paused = true)]
async fn one_stale_gid_fails_the_scenario() {
    let mut replies = vec![Reply::ok("50000\n"); 20];
    replies.push(Reply::ok("1234400513\n"));
    replies.push(Reply::ok("50000\n"));
    let lab = idoverride_lab(replies);

    let report = lab.run(&HonourIdOverride::new(&AdTrustConfig::default())).await;

    assert_eq!(failure_message(&report), "Stale gid was returned");
    assert_eq!(report.polls[0].counts.matches, 1);
    assert_eq!(report.polls[0].counts.attempts, 50);
}

#[tokio::test(start_paused = true)]
async fn ad_fixture_is_removed_after_view() {
    let lab = idoverride_lab(vec![Reply::ok("50000\n")]);

    let report = lab.run(&HonourIdOverride::new(&AdTrustConfig::default())).await;

    assert_eq!(report.outcome, ScenarioOutcome::Passed);
    assert_eq!(lab.ad.count("New-ADUser"), 1);
    assert_eq!(lab.ad.count("Remove-ADUser"), 1);
    assert_eq!(lab.ad.count("Remove-ADGroup"), 1);
    let view_del = command_index(&report, "idview-del 'madrid_trust_view'");
    let group_del = command_index(&report, "Remove-ADGroup");
    let user_del = command_index(&report, "Remove-ADUser");
    assert!(view_del < group_del && group_del < user_del);

    let user = lab.ad.history()[0].clone();
    let created = user
        .split('\'')
        .nth(1)
        .expect("user name is quoted")
        .to_owned();
    assert!(lab.ad.history().iter().any(|c| c.contains(&format!("Remove-ADUser -Identity '{created}'"))));
    assert_eq!(
        lab.master.count(&format!("--home='/home/{created}'")),
        1
    );
}

#[tokio::test(start_paused = true)]
async fn empty_current_gid_is_an_extraction_error() {
    let lab = Lab::new(
        master().on("id -g ", Reply::ok("")),
        client(),
        ad(),
    );

    let report = lab.run(&HonourIdOverride::new(&AdTrustConfig::default())).await;

    match &report.outcome {
        ScenarioOutcome::Errored { error } => assert!(error.contains("current gid"), "{error}"),
        other => panic!("expected Errored, got {other:?}"),
    }
    assert_eq!(lab.ad.count("Remove-ADUser"), 1);
}

const POSIX_SHOW: &str = "  Group name: posix_group_01\n  GID: 1234400007\n  Member groups: ext_group_01\n";
const EXTERNAL_SHOW: &str = "  Group name: ext_group_01\n  Member of groups: posix_group_01\n";
const ID_WITH_POSIX: &str = "uid=1(u) gid=2(u) groups=2(u),1234400007(posix_group_01)";
const ID_WITHOUT_POSIX: &str = "uid=1(u) gid=2(u) groups=2(u)";

fn posix_lab(id_replies: Vec<Reply>) -> Lab {
    Lab::new(
        master()
            .on("group-show 'posix_group_01'", Reply::ok(POSIX_SHOW))
            .on("group-show 'ext_group_01'", Reply::ok(EXTERNAL_SHOW))
            .on_sequence("id 'testuser", id_replies),
        client(),
        ad(),
    )
}

#[tokio::test(start_paused = true)]
async fn posix_membership_seen_in_every_round() {
    let lab = posix_lab(vec![Reply::ok(ID_WITH_POSIX)]);

    let report = lab
        .run(&MissingSecondaryPosixGroups::new(&AdTrustConfig::default()))
        .await;

    assert_eq!(report.outcome, ScenarioOutcome::Passed);
    assert_eq!(lab.master.count("getent group '1234400007'"), 5);
    assert_eq!(lab.master.count("systemctl start sssd"), 5);
    let rounds = &report.polls[0];
    assert_eq!(rounds.label, "posix group membership");
    assert_eq!((rounds.counts.attempts, rounds.counts.matches), (5, 5));
    assert_eq!(
        lab.master
            .count("ipa config-mod --domain-resolution-order='ad.test:ipa.test'"),
        1
    );
}

#[tokio::test(start_paused = true)]
async fn posix_teardown_reverses_setup() {
    let lab = posix_lab(vec![Reply::ok(ID_WITH_POSIX)]);

    let report = lab
        .run(&MissingSecondaryPosixGroups::new(&AdTrustConfig::default()))
        .await;

    let order = [
        "group-remove-member 'ext_group_01' --external",
        "group-remove-member 'posix_group_01' --groups='ext_group_01'",
        "group-del 'ext_group_01'",
        "group-del 'posix_group_01'",
        "--domain-resolution-order='ipa.test:ad.test'",
        "Remove-ADGroup",
        "Remove-ADUser",
    ];
    let positions: Vec<usize> = order.iter().map(|p| command_index(&report, p)).collect();
    assert!(positions.windows(2).all(|w| w[0] < w[1]), "{positions:?}");
    assert_eq!(report.teardown.executed, 7);
    assert!(
        report.commands[positions[0]..]
            .iter()
            .all(|c| c.phase == Phase::Teardown)
    );
}

#[tokio::test(start_paused = true)]
async fn posix_membership_lost_in_some_rounds() {
    // probe, round 1, round 2 see the group; rounds 3..5 do not
    let lab = posix_lab(vec![
        Reply::ok(ID_WITH_POSIX),
        Reply::ok(ID_WITH_POSIX),
        Reply::ok(ID_WITH_POSIX),
        Reply::ok(ID_WITHOUT_POSIX),
    ]);

    let report = lab
        .run(&MissingSecondaryPosixGroups::new(&AdTrustConfig::default()))
        .await;

    assert_eq!(failure_message(&report), "The user is not a member of posix group!");
    assert_eq!(report.polls[0].counts.matches, 2);
    assert_eq!(report.teardown.executed, 7);
}

#[tokio::test(start_paused = true)]
async fn posix_user_lookup_failure_stops_rounds() {
    let lab = posix_lab(vec![Reply::ok(ID_WITH_POSIX), Reply::fail(1, "no such user")]);

    let report = lab
        .run(&MissingSecondaryPosixGroups::new(&AdTrustConfig::default()))
        .await;

    assert_eq!(
        failure_message(&report),
        "Could not find the user, something wrong with setup!"
    );
    assert_eq!(lab.master.count("getent group"), 1);
}

#[tokio::test(start_paused = true)]
async fn posix_gid_missing_from_group_show() {
    let lab = Lab::new(
        master().on("group-show 'posix_group_01'", Reply::ok("  Group name: posix_group_01\n")),
        client(),
        ad(),
    );

    let report = lab
        .run(&MissingSecondaryPosixGroups::new(&AdTrustConfig::default()))
        .await;

    match &report.outcome {
        ScenarioOutcome::Errored { error } => assert!(error.contains("posix group GID"), "{error}"),
        other => panic!("expected Errored, got {other:?}"),
    }
    assert_eq!(lab.master.count("getent group"), 0);
    assert_eq!(report.teardown.executed, 7);
}

#[tokio::test]
async fn private_group_user_deleted_before_assertions() {
    let lab = Lab::new(
        master()
            .on("getsidbyname(\"admin\")", Reply::ok("{'sid': 'S-1-5-21-1-2-3-500', 'type': 3}"))
            .on("getsidbyname(\"some-user\")", Reply::fail(2, "")),
        client(),
        ad(),
    );

    let report = lab
        .run(&NssGetByNameWithPrivateGroup::new(&AdTrustConfig::default()))
        .await;

    assert_eq!(
        failure_message(&report),
        "pysss_nss_idmap.getsidbyname for some-user failed"
    );
    assert_eq!(lab.master.count("ipa user-del 'some-user'"), 1);
    let deleted = command_index(&report, "user-del");
    assert!(deleted > command_index(&report, "getsidbyname(\"some-user\")"));
    assert_eq!(report.commands[deleted].phase, Phase::Exercise);
    assert_eq!(report.teardown.executed, 0);
}

#[tokio::test]
async fn private_group_user_resolves_by_sid() {
    let lab = Lab::new(master(), client(), ad());

    let report = lab
        .run(&NssGetByNameWithPrivateGroup::new(&AdTrustConfig::default()))
        .await;

    assert_eq!(report.outcome, ScenarioOutcome::Passed);
    assert_eq!(
        lab.master
            .count("ipa user-add 'some-user' --first='Some' --last='User'"),
        1
    );
}
