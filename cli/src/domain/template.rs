//! CloudFormation rendering of a [`DeploymentStack`].
//!
//! Output is a `serde_json::Value` whose maps are ordered, so the same stack
//! always renders to byte-identical text.

use serde_json::{Value, json};

use crate::domain::network::{SubnetAllocation, SubnetRole};
use crate::domain::stack::DeploymentStack;

/// Bootstrap qualifier of the container-asset repository.
pub const BOOTSTRAP_QUALIFIER: &str = "hnb659fds";

// ── Logical ids ──────────────────────────────────────────────────────────────

const VPC: &str = "Vpc";
const IGW: &str = "VpcIGW";
const IGW_ATTACHMENT: &str = "VpcVPCGW";
const NAT_EIP: &str = "VpcNatEIP";
const NAT_GATEWAY: &str = "VpcNATGateway";
const PUBLIC_ROUTE_TABLE: &str = "VpcPublicRouteTable";
const PUBLIC_DEFAULT_ROUTE: &str = "VpcPublicDefaultRoute";
const PRIVATE_ROUTE_TABLE: &str = "VpcPrivateRouteTable";
const PRIVATE_DEFAULT_ROUTE: &str = "VpcPrivateDefaultRoute";
const CLUSTER: &str = "Cluster";
const LOG_GROUP: &str = "LogGroup";

fn subnet_id(subnet: &SubnetAllocation) -> String {
    format!("Vpc{}Subnet{}", pascal_case(&subnet.group), subnet.az_index + 1)
}

/// `private-subnet` → `PrivateSubnet`.
fn pascal_case(raw: &str) -> String {
    raw.split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            chars.next().map_or_else(String::new, |first| {
                first.to_ascii_uppercase().to_string() + chars.as_str()
            })
        })
        .collect()
}

fn reference(id: &str) -> Value {
    json!({ "Ref": id })
}

fn get_att(id: &str, attribute: &str) -> Value {
    json!({ "Fn::GetAtt": [id, attribute] })
}

fn tags(stack: &DeploymentStack, name: Option<&str>) -> Value {
    let mut tags: Vec<Value> = stack
        .tags
        .iter()
        .map(|(k, v)| json!({ "Key": k, "Value": v }))
        .collect();
    if let Some(name) = name {
        tags.push(json!({ "Key": "Name", "Value": name }));
    }
    Value::Array(tags)
}

fn secret_arn(stack: &DeploymentStack) -> String {
    format!(
        "arn:${{AWS::Partition}}:secretsmanager:${{AWS::Region}}:${{AWS::AccountId}}:secret:{}",
        stack.secret.secret_name
    )
}

fn asset_repository() -> String {
    format!("cdk-{BOOTSTRAP_QUALIFIER}-container-assets-${{AWS::AccountId}}-${{AWS::Region}}")
}

// ── Template ─────────────────────────────────────────────────────────────────

/// Render the full CloudFormation template.
#[must_use]
pub fn render_template(stack: &DeploymentStack) -> Value {
    let mut resources = serde_json::Map::new();
    network_resources(stack, &mut resources);
    compute_resources(stack, &mut resources);
    service_resources(stack, &mut resources);

    let svc = &stack.service.id;
    let lb = format!("{svc}LB");
    json!({
        "AWSTemplateFormatVersion": "2010-09-09",
        "Description": format!(
            "Java agent integration-test topology ({})",
            stack.stack_name
        ),
        "Metadata": {
            "StackName": stack.stack_name,
            "Tags": stack.tags,
        },
        "Resources": resources,
        "Outputs": {
            format!("{svc}LoadBalancerDNS"): { "Value": get_att(&lb, "DNSName") },
            format!("{svc}ServiceURL"): {
                "Value": {
                    "Fn::Join": ["", [
                        format!("{}://", stack.service.listener.protocol.to_string().to_lowercase()),
                        get_att(&lb, "DNSName"),
                        format!(":{}", stack.service.listener.port),
                    ]]
                }
            },
        },
    })
}

fn network_resources(stack: &DeploymentStack, out: &mut serde_json::Map<String, Value>) {
    let network = &stack.network;
    out.insert(
        VPC.to_string(),
        json!({
            "Type": "AWS::EC2::VPC",
            "Properties": {
                "CidrBlock": network.cidr.to_string(),
                "EnableDnsHostnames": true,
                "EnableDnsSupport": true,
                "InstanceTenancy": "default",
                "Tags": tags(stack, Some(&network.vpc_name)),
            }
        }),
    );
    out.insert(
        IGW.to_string(),
        json!({
            "Type": "AWS::EC2::InternetGateway",
            "Properties": { "Tags": tags(stack, Some(&network.vpc_name)) }
        }),
    );
    out.insert(
        IGW_ATTACHMENT.to_string(),
        json!({
            "Type": "AWS::EC2::VPCGatewayAttachment",
            "Properties": { "VpcId": reference(VPC), "InternetGatewayId": reference(IGW) }
        }),
    );

    out.insert(
        PUBLIC_ROUTE_TABLE.to_string(),
        json!({ "Type": "AWS::EC2::RouteTable", "Properties": { "VpcId": reference(VPC) } }),
    );
    out.insert(
        PUBLIC_DEFAULT_ROUTE.to_string(),
        json!({
            "Type": "AWS::EC2::Route",
            "Properties": {
                "RouteTableId": reference(PUBLIC_ROUTE_TABLE),
                "DestinationCidrBlock": "0.0.0.0/0",
                "GatewayId": reference(IGW),
            },
            "DependsOn": [IGW_ATTACHMENT],
        }),
    );
    out.insert(
        PRIVATE_ROUTE_TABLE.to_string(),
        json!({ "Type": "AWS::EC2::RouteTable", "Properties": { "VpcId": reference(VPC) } }),
    );

    for subnet in &stack.subnets {
        let id = subnet_id(subnet);
        let public = subnet.role == SubnetRole::Public;
        let name = format!("{}/{}", network.vpc_name, id);
        out.insert(
            id.clone(),
            json!({
                "Type": "AWS::EC2::Subnet",
                "Properties": {
                    "VpcId": reference(VPC),
                    "CidrBlock": subnet.cidr.to_string(),
                    "AvailabilityZone": {
                        "Fn::Select": [subnet.az_index, { "Fn::GetAZs": "" }]
                    },
                    "MapPublicIpOnLaunch": public,
                    "Tags": tags(stack, Some(&name)),
                }
            }),
        );
        let table = if public { PUBLIC_ROUTE_TABLE } else { PRIVATE_ROUTE_TABLE };
        out.insert(
            format!("{id}RouteTableAssociation"),
            json!({
                "Type": "AWS::EC2::SubnetRouteTableAssociation",
                "Properties": { "RouteTableId": reference(table), "SubnetId": reference(&id) }
            }),
        );
    }

    // NAT gateways go into the first public subnets, one per gateway.
    let nat_subnets: Vec<String> = stack
        .subnets
        .iter()
        .filter(|s| s.role == SubnetRole::Public)
        .take(usize::from(network.nat_gateways))
        .map(subnet_id)
        .collect();
    if let Some(nat_subnet) = nat_subnets.first() {
        out.insert(
            NAT_EIP.to_string(),
            json!({ "Type": "AWS::EC2::EIP", "Properties": { "Domain": "vpc" } }),
        );
        out.insert(
            NAT_GATEWAY.to_string(),
            json!({
                "Type": "AWS::EC2::NatGateway",
                "Properties": {
                    "SubnetId": reference(nat_subnet),
                    "AllocationId": get_att(NAT_EIP, "AllocationId"),
                    "Tags": tags(stack, Some(&network.vpc_name)),
                },
                "DependsOn": [format!("{nat_subnet}RouteTableAssociation")],
            }),
        );
        out.insert(
            PRIVATE_DEFAULT_ROUTE.to_string(),
            json!({
                "Type": "AWS::EC2::Route",
                "Properties": {
                    "RouteTableId": reference(PRIVATE_ROUTE_TABLE),
                    "DestinationCidrBlock": "0.0.0.0/0",
                    "NatGatewayId": reference(NAT_GATEWAY),
                }
            }),
        );
    }
}

fn compute_resources(stack: &DeploymentStack, out: &mut serde_json::Map<String, Value>) {
    let task = &stack.task_definition;
    let container = &task.container;
    let exec_role = format!("{}ExecutionRole", task.id);
    let task_role = format!("{}TaskRole", task.id);
    let secret_arn = secret_arn(stack);

    out.insert(
        CLUSTER.to_string(),
        json!({
            "Type": "AWS::ECS::Cluster",
            "Properties": {
                "ClusterName": stack.cluster.cluster_name,
                "Tags": tags(stack, None),
            }
        }),
    );
    out.insert(
        LOG_GROUP.to_string(),
        json!({
            "Type": "AWS::Logs::LogGroup",
            "Properties": {
                "LogGroupName": stack.log_destination.log_group_name,
                "RetentionInDays": 731,
            },
            "UpdateReplacePolicy": "Retain",
            "DeletionPolicy": "Retain",
        }),
    );

    let assume_ecs_tasks = json!({
        "Version": "2012-10-17",
        "Statement": [{
            "Action": "sts:AssumeRole",
            "Effect": "Allow",
            "Principal": { "Service": "ecs-tasks.amazonaws.com" },
        }]
    });
    out.insert(
        task_role.clone(),
        json!({
            "Type": "AWS::IAM::Role",
            "Properties": { "AssumeRolePolicyDocument": assume_ecs_tasks }
        }),
    );
    out.insert(
        exec_role.clone(),
        json!({
            "Type": "AWS::IAM::Role",
            "Properties": {
                "AssumeRolePolicyDocument": assume_ecs_tasks,
                "Policies": [{
                    "PolicyName": format!("{exec_role}DefaultPolicy"),
                    "PolicyDocument": {
                        "Version": "2012-10-17",
                        "Statement": [
                            {
                                "Action": ["ecr:BatchCheckLayerAvailability", "ecr:BatchGetImage", "ecr:GetDownloadUrlForLayer"],
                                "Effect": "Allow",
                                "Resource": {
                                    "Fn::Sub": format!(
                                        "arn:${{AWS::Partition}}:ecr:${{AWS::Region}}:${{AWS::AccountId}}:repository/{}",
                                        asset_repository()
                                    )
                                },
                            },
                            {
                                "Action": "ecr:GetAuthorizationToken",
                                "Effect": "Allow",
                                "Resource": "*",
                            },
                            {
                                "Action": ["logs:CreateLogStream", "logs:PutLogEvents"],
                                "Effect": "Allow",
                                "Resource": get_att(LOG_GROUP, "Arn"),
                            },
                            {
                                "Action": ["secretsmanager:DescribeSecret", "secretsmanager:GetSecretValue"],
                                "Effect": "Allow",
                                "Resource": { "Fn::Sub": format!("{secret_arn}-??????") },
                            },
                        ]
                    }
                }]
            }
        }),
    );

    let environment: Vec<Value> = container
        .environment
        .iter()
        .map(|(name, value)| json!({ "Name": name, "Value": value }))
        .collect();
    let secrets: Vec<Value> = container
        .secrets
        .iter()
        .map(|(name, secret)| {
            json!({
                "Name": name,
                "ValueFrom": { "Fn::Sub": format!("{secret_arn}:{}::", secret.json_key) },
            })
        })
        .collect();
    let port_mappings: Vec<Value> = container
        .port_mappings
        .iter()
        .map(|m| json!({ "ContainerPort": m.container_port, "Protocol": m.protocol.to_string() }))
        .collect();

    out.insert(
        task.id.clone(),
        json!({
            "Type": "AWS::ECS::TaskDefinition",
            "Properties": {
                "Family": format!("{}-{}", stack.stack_name, task.id),
                "Cpu": task.cpu.to_string(),
                "Memory": task.memory_mib.to_string(),
                "NetworkMode": "awsvpc",
                "RequiresCompatibilities": ["FARGATE"],
                "ExecutionRoleArn": get_att(&exec_role, "Arn"),
                "TaskRoleArn": get_att(&task_role, "Arn"),
                "ContainerDefinitions": [{
                    "Name": container.name,
                    "Essential": true,
                    "Image": {
                        "Fn::Sub": format!(
                            "${{AWS::AccountId}}.dkr.ecr.${{AWS::Region}}.${{AWS::URLSuffix}}/{}:{}",
                            asset_repository(),
                            container.image.asset_hash
                        )
                    },
                    "MemoryReservation": container.memory_reservation_mib,
                    "Environment": environment,
                    "Secrets": secrets,
                    "PortMappings": port_mappings,
                    "LogConfiguration": {
                        "LogDriver": "awslogs",
                        "Options": {
                            "awslogs-group": reference(LOG_GROUP),
                            "awslogs-stream-prefix": container.logging.stream_prefix,
                            "awslogs-region": { "Ref": "AWS::Region" },
                        }
                    },
                }],
                "Tags": tags(stack, None),
            }
        }),
    );
}

fn service_resources(stack: &DeploymentStack, out: &mut serde_json::Map<String, Value>) {
    let service = &stack.service;
    let svc = &service.id;
    let lb = format!("{svc}LB");
    let lb_sg = format!("{svc}LBSecurityGroup");
    let listener = format!("{svc}LBPublicListener");
    let target_group = format!("{svc}TargetGroup");
    let service_sg = format!("{svc}ServiceSecurityGroup");
    let service_id = format!("{svc}Service");
    let container_port = stack
        .task_definition
        .container
        .exposed_port()
        .unwrap_or(service.listener.port);

    let public_subnets: Vec<Value> = stack
        .subnets
        .iter()
        .filter(|s| s.role == SubnetRole::Public)
        .map(|s| reference(&subnet_id(s)))
        .collect();
    let private_subnets: Vec<Value> = stack
        .subnets
        .iter()
        .filter(|s| s.role == SubnetRole::PrivateWithEgress)
        .map(|s| reference(&subnet_id(s)))
        .collect();

    out.insert(
        lb_sg.clone(),
        json!({
            "Type": "AWS::EC2::SecurityGroup",
            "Properties": {
                "GroupDescription": format!("Load balancer for {}", stack.stack_name),
                "VpcId": reference(VPC),
                "SecurityGroupIngress": [{
                    "CidrIp": "0.0.0.0/0",
                    "IpProtocol": "tcp",
                    "FromPort": service.listener.port,
                    "ToPort": service.listener.port,
                    "Description": "Allow from anyone on the listener port",
                }],
            }
        }),
    );
    out.insert(
        service_sg.clone(),
        json!({
            "Type": "AWS::EC2::SecurityGroup",
            "Properties": {
                "GroupDescription": format!("Service tasks for {}", stack.stack_name),
                "VpcId": reference(VPC),
                "SecurityGroupIngress": [{
                    "SourceSecurityGroupId": get_att(&lb_sg, "GroupId"),
                    "IpProtocol": "tcp",
                    "FromPort": container_port,
                    "ToPort": container_port,
                    "Description": "Load balancer to target",
                }],
            }
        }),
    );
    out.insert(
        lb.clone(),
        json!({
            "Type": "AWS::ElasticLoadBalancingV2::LoadBalancer",
            "Properties": {
                "Type": "application",
                "Scheme": "internet-facing",
                "Subnets": public_subnets,
                "SecurityGroups": [get_att(&lb_sg, "GroupId")],
                "Tags": tags(stack, None),
            },
            "DependsOn": [PUBLIC_DEFAULT_ROUTE],
        }),
    );

    let mut tg_properties = json!({
        "Port": service.target_group.port,
        "Protocol": service.target_group.protocol.to_string(),
        "TargetType": "ip",
        "VpcId": reference(VPC),
        "Tags": tags(stack, None),
    });
    if let (Some(hc), Some(props)) = (
        service.target_group.health_check(),
        tg_properties.as_object_mut(),
    ) {
        props.insert("HealthCheckPath".to_string(), json!(hc.path));
        props.insert(
            "HealthCheckIntervalSeconds".to_string(),
            json!(hc.interval_secs),
        );
        props.insert(
            "UnhealthyThresholdCount".to_string(),
            json!(hc.unhealthy_threshold),
        );
        props.insert("HealthCheckPort".to_string(), json!(hc.port));
        props.insert(
            "HealthCheckProtocol".to_string(),
            json!(hc.protocol.to_string()),
        );
    }
    out.insert(
        target_group.clone(),
        json!({ "Type": "AWS::ElasticLoadBalancingV2::TargetGroup", "Properties": tg_properties }),
    );
    out.insert(
        listener.clone(),
        json!({
            "Type": "AWS::ElasticLoadBalancingV2::Listener",
            "Properties": {
                "LoadBalancerArn": reference(&lb),
                "Port": service.listener.port,
                "Protocol": service.listener.protocol.to_string(),
                "DefaultActions": [{ "Type": "forward", "TargetGroupArn": reference(&target_group) }],
            }
        }),
    );
    out.insert(
        service_id,
        json!({
            "Type": "AWS::ECS::Service",
            "Properties": {
                "Cluster": reference(CLUSTER),
                "TaskDefinition": reference(&stack.task_definition.id),
                "DesiredCount": service.desired_count,
                "LaunchType": "FARGATE",
                "HealthCheckGracePeriodSeconds": 60,
                "DeploymentConfiguration": { "MaximumPercent": 200, "MinimumHealthyPercent": 50 },
                "LoadBalancers": [{
                    "ContainerName": stack.task_definition.container.name,
                    "ContainerPort": container_port,
                    "TargetGroupArn": reference(&target_group),
                }],
                "NetworkConfiguration": {
                    "AwsvpcConfiguration": {
                        "AssignPublicIp": "DISABLED",
                        "SecurityGroups": [get_att(&service_sg, "GroupId")],
                        "Subnets": private_subnets,
                    }
                },
                "Tags": tags(stack, None),
            },
            "DependsOn": [listener, PRIVATE_DEFAULT_ROUTE],
        }),
    );
}

// ── Asset manifest ───────────────────────────────────────────────────────────

/// Describe the container image the resolver must build before deploying.
#[must_use]
pub fn render_asset_manifest(stack: &DeploymentStack) -> Value {
    let image = &stack.task_definition.container.image;
    let account = stack.environment.account().unwrap_or("current_account");
    let region = stack
        .environment
        .region
        .as_deref()
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .unwrap_or("current_region");
    json!({
        "version": "36.0.0",
        "files": {},
        "dockerImages": {
            image.asset_hash.clone(): {
                "source": {
                    "directory": image.context_dir.to_string_lossy(),
                    "platform": image.platform,
                },
                "destinations": {
                    format!("{account}-{region}"): {
                        "repositoryName": format!("cdk-{BOOTSTRAP_QUALIFIER}-container-assets-{account}-{region}"),
                        "imageTag": image.asset_hash,
                    }
                }
            }
        }
    })
}
